//! printf形式フォーマッタモジュール
//!
//! `%d` `%s` `%v` などの書式指定子で引数を埋め込んだ文字列を生成する。
//! 引数の不足・型不一致・余剰があってもパニックせず、結果の文字列中に
//! `%!d(MISSING)` のようなマーカーを埋め込んで返す。

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// 幅・精度の上限（これを超える指定は無視してマーカーを出す）
const MAX_WIDTH: usize = 1_000_000;

/// 精度なしの `%g` / `%v` で指数表記に切り替える指数
const SHORTEST_EXP_LIMIT: i32 = 6;

/// フォーマット引数
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Bool(bool),
    Char(char),
    /// `Display` を実装する任意の値
    Other {
        type_name: &'static str,
        text: String,
    },
}

impl Arg {
    /// `Display` 実装を持つ任意の値から引数を作成
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Arg::Other {
            type_name: std::any::type_name::<T>(),
            text: value.to_string(),
        }
    }

    /// 文字列表現から値の種類を推測して引数を作成
    ///
    /// CLIのように引数がすべて文字列で渡される場面で使う。
    pub fn infer(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            return Arg::Int(v);
        }
        if let Ok(v) = raw.parse::<u64>() {
            return Arg::Uint(v);
        }
        // "inf" や "nan" は文字列のまま扱う
        if raw.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(v) = raw.parse::<f64>() {
                return Arg::Float(v);
            }
        }
        match raw {
            "true" => Arg::Bool(true),
            "false" => Arg::Bool(false),
            _ => Arg::Str(raw.to_string()),
        }
    }

    /// マーカーに埋め込む型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Uint(_) => "uint",
            Arg::Float(_) => "float64",
            Arg::Str(_) => "string",
            Arg::Bool(_) => "bool",
            Arg::Char(_) => "char",
            Arg::Other { type_name, .. } => type_name,
        }
    }

    /// `%v` 相当の既定表現
    fn default_text(&self) -> String {
        match self {
            Arg::Int(v) => v.to_string(),
            Arg::Uint(v) => v.to_string(),
            Arg::Float(v) => float('v', &Spec::default(), *v)
                .map(|(text, _)| text)
                .unwrap_or_default(),
            Arg::Str(s) => s.clone(),
            Arg::Bool(b) => b.to_string(),
            Arg::Char(c) => c.to_string(),
            Arg::Other { text, .. } => text.clone(),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

impl_from!(Int as i64: i8, i16, i32, i64);
impl_from!(Uint as u64: u8, u16, u32, u64);
impl_from!(Float as f64: f32, f64);
impl_from!(Bool as bool: bool);
impl_from!(Char as char: char);

impl From<isize> for Arg {
    fn from(v: isize) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<usize> for Arg {
    fn from(v: usize) -> Self {
        Arg::Uint(v as u64)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v)
    }
}

impl From<&String> for Arg {
    fn from(v: &String) -> Self {
        Arg::Str(v.clone())
    }
}

/// フォーマット引数のリストを作成する
///
/// ```
/// use lvlog::{args, format::sprintf};
///
/// assert_eq!(sprintf("%s=%d", &args!["x", 5]), "x=5");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::format::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::format::Arg::from($arg)),+]
    };
}

/// 書式指定（フラグ・幅・精度）
#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    minus: bool,
    plus: bool,
    sharp: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// 書式文字列に引数を埋め込む
///
/// 副作用はなく、どんな入力でもパニックしない。
pub fn sprintf(format: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut chars = format.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '#' => spec.sharp = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                _ => break,
            }
            chars.next();
        }

        // `*` は幅を引数から取る。負の幅は左寄せ
        if chars.peek() == Some(&'*') {
            chars.next();
            match star_arg(args, &mut next_arg) {
                Some(n) if n.unsigned_abs() <= MAX_WIDTH as u64 => {
                    spec.minus |= n < 0;
                    spec.width = Some(n.unsigned_abs() as usize);
                }
                _ => out.push_str("%!(BADWIDTH)"),
            }
        } else {
            match read_number(&mut chars) {
                Some(n) if n > MAX_WIDTH => out.push_str("%!(BADWIDTH)"),
                n => spec.width = n,
            }
        }

        if chars.peek() == Some(&'.') {
            chars.next();
            if chars.peek() == Some(&'*') {
                chars.next();
                match star_arg(args, &mut next_arg) {
                    Some(n) if (0..=MAX_WIDTH as i64).contains(&n) => {
                        spec.precision = Some(n as usize)
                    }
                    _ => out.push_str("%!(BADPREC)"),
                }
            } else {
                match read_number(&mut chars) {
                    Some(n) if n > MAX_WIDTH => out.push_str("%!(BADPREC)"),
                    n => spec.precision = Some(n.unwrap_or(0)),
                }
            }
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        let Some(arg) = args.get(next_arg) else {
            out.push_str(&format!("%!{}(MISSING)", verb));
            continue;
        };
        next_arg += 1;

        match render(verb, &spec, arg) {
            Some((body, numeric)) => out.push_str(&pad(body, &spec, numeric)),
            None => out.push_str(&bad_verb(verb, arg)),
        }
    }

    if next_arg < args.len() {
        let extra: Vec<String> = args[next_arg..]
            .iter()
            .map(|a| format!("{}={}", a.type_name(), a.default_text()))
            .collect();
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }

    out
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        // 上限超過はsaturatingで保持し、呼び出し側でマーカーにする
        value = Some(
            value
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(d as usize),
        );
    }
    value
}

/// `*` に対応する整数引数を取り出す（引数は整数以外でも消費する）
fn star_arg(args: &[Arg], next_arg: &mut usize) -> Option<i64> {
    let arg = args.get(*next_arg)?;
    *next_arg += 1;
    match arg {
        Arg::Int(v) => Some(*v),
        Arg::Uint(v) => i64::try_from(*v).ok(),
        _ => None,
    }
}

fn bad_verb(verb: char, arg: &Arg) -> String {
    format!("%!{}({}={})", verb, arg.type_name(), arg.default_text())
}

/// 引数を書式指定子で描画する（幅は未適用）
///
/// 戻り値の `bool` はゼロ埋め対象の数値かどうか。
/// 指定子と引数の型が合わなければ `None`。
fn render(verb: char, spec: &Spec, arg: &Arg) -> Option<(String, bool)> {
    if verb == 'T' {
        return Some((arg.type_name().to_string(), false));
    }

    match arg {
        Arg::Int(v) => integer(verb, spec, i128::from(*v)),
        Arg::Uint(v) => integer(verb, spec, i128::from(*v)),
        Arg::Float(v) => float(verb, spec, *v),
        Arg::Str(s) => string(verb, spec, s),
        Arg::Other { text, .. } => match verb {
            'v' | 's' | 'q' => string(verb, spec, text),
            _ => None,
        },
        Arg::Bool(b) => match verb {
            'v' | 't' => Some((b.to_string(), false)),
            _ => None,
        },
        Arg::Char(c) => match verb {
            'v' | 'c' | 's' => Some((c.to_string(), false)),
            'q' => Some((format!("{:?}", c), false)),
            _ => integer(verb, spec, i128::from(u32::from(*c))),
        },
    }
}

fn integer(verb: char, spec: &Spec, v: i128) -> Option<(String, bool)> {
    let mag = v.unsigned_abs();
    let (digits, prefix) = match verb {
        'v' | 'd' => (mag.to_string(), ""),
        'x' => (format!("{:x}", mag), "0x"),
        'X' => (format!("{:X}", mag), "0X"),
        'o' => (format!("{:o}", mag), "0"),
        'b' => (format!("{:b}", mag), "0b"),
        'c' | 'q' => {
            let ch = u32::try_from(v)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            let text = if verb == 'c' {
                ch.to_string()
            } else {
                format!("{:?}", ch)
            };
            return Some((text, false));
        }
        _ => return None,
    };

    // 整数の精度は最小桁数
    let digits = match spec.precision {
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    };
    let prefix = if spec.sharp { prefix } else { "" };

    Some((
        format!("{}{}{}", sign(v < 0, spec), prefix, digits),
        spec.precision.is_none(),
    ))
}

fn float(verb: char, spec: &Spec, v: f64) -> Option<(String, bool)> {
    let body = match verb {
        'v' | 'g' => general(v.abs(), spec.precision, false),
        'G' => general(v.abs(), spec.precision, true),
        'f' | 'F' => fixed(v.abs(), spec.precision.unwrap_or(6)),
        'e' => exponent(v.abs(), spec.precision.unwrap_or(6), false),
        'E' => exponent(v.abs(), spec.precision.unwrap_or(6), true),
        _ => return None,
    };
    let negative = v.is_sign_negative() && !v.is_nan();
    Some((format!("{}{}", sign(negative, spec), body), v.is_finite()))
}

fn string(verb: char, spec: &Spec, s: &str) -> Option<(String, bool)> {
    let s: String = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    let body = match verb {
        'v' | 's' => s,
        'q' if spec.sharp && !s.contains('`') => format!("`{}`", s),
        'q' => format!("{:?}", s),
        'x' | 'X' => hex_bytes(&s, spec, verb == 'X'),
        _ => return None,
    };
    Some((body, false))
}

fn hex_bytes(s: &str, spec: &Spec, upper: bool) -> String {
    let prefix = match (spec.sharp, upper) {
        (false, _) => "",
        (true, false) => "0x",
        (true, true) => "0X",
    };
    let bytes = s.bytes().map(|b| {
        if upper {
            format!("{:02X}", b)
        } else {
            format!("{:02x}", b)
        }
    });

    if spec.space {
        bytes
            .map(|b| format!("{}{}", prefix, b))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        format!("{}{}", prefix, bytes.collect::<String>())
    }
}

fn sign(negative: bool, spec: &Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

/// 非有限値の表記（符号は呼び出し側で付与）
fn non_finite(v: f64) -> Option<String> {
    if v.is_nan() {
        Some("NaN".to_string())
    } else if v.is_infinite() {
        Some("Inf".to_string())
    } else {
        None
    }
}

fn fixed(v: f64, precision: usize) -> String {
    non_finite(v).unwrap_or_else(|| format!("{:.*}", precision, v))
}

/// 指数表記。指数部は符号付き2桁以上（例: `1.500000e+00`）
fn exponent(v: f64, precision: usize, upper: bool) -> String {
    if let Some(s) = non_finite(v) {
        return s;
    }
    normalize_exponent(&format!("{:.*e}", precision, v), upper)
}

fn normalize_exponent(raw: &str, upper: bool) -> String {
    let Some((mantissa, exp)) = raw.split_once('e') else {
        return raw.to_string();
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}{}{:02}", mantissa, e, sign, exp.unsigned_abs())
}

/// `%g` / `%v` 形式。精度は有効桁数
///
/// 精度なしでは最短表現の桁を使い、指数が -4 未満か 6 以上なら指数表記にする。
fn general(v: f64, precision: Option<usize>, upper: bool) -> String {
    if let Some(s) = non_finite(v) {
        return s;
    }
    if v == 0.0 {
        return "0".to_string();
    }

    match precision {
        None => {
            let sci = format!("{:e}", v);
            let exp: i32 = sci
                .split_once('e')
                .and_then(|(_, e)| e.parse().ok())
                .unwrap_or(0);
            if exp < -4 || exp >= SHORTEST_EXP_LIMIT {
                normalize_exponent(&sci, upper)
            } else {
                v.to_string()
            }
        }
        Some(p) => {
            let p = p.max(1);
            let sci = format!("{:.*e}", p - 1, v);
            let exp: i32 = sci
                .split_once('e')
                .and_then(|(_, e)| e.parse().ok())
                .unwrap_or(0);
            if exp < -4 || exp >= p as i32 {
                let (mantissa, _) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
                let trimmed = trim_fraction(mantissa);
                normalize_exponent(&format!("{}e{}", trimmed, exp), upper)
            } else {
                let decimals = (p as i32 - 1 - exp).max(0) as usize;
                trim_fraction(&format!("{:.*}", decimals, v)).to_string()
            }
        }
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// 幅指定に合わせて埋める
fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let len = body.chars().count();
    let Some(width) = spec.width.filter(|w| *w > len) else {
        return body;
    };
    let fill = width - len;

    if spec.minus {
        return format!("{}{}", body, " ".repeat(fill));
    }
    if spec.zero && numeric {
        // 符号と基数プレフィックスの後ろにゼロを挿入
        let mut split = usize::from(body.starts_with(['+', '-', ' ']));
        let rest = &body[split..];
        if spec.sharp && (rest.starts_with("0x") || rest.starts_with("0X") || rest.starts_with("0b"))
        {
            split += 2;
        }
        let (head, tail) = body.split_at(split);
        return format!("{}{}{}", head, "0".repeat(fill), tail);
    }
    format!("{}{}", " ".repeat(fill), body)
}
