//! Strings matching a regular expression, generated from its parsed HIR.

use rand::Rng;
use rand::seq::SliceRandom;
use regex_syntax::hir::{
    Class, ClassBytes, ClassBytesRange, ClassUnicode, ClassUnicodeRange, Hir, HirKind,
};

/// Generates a string matched by `pattern`.
///
/// Unbounded repetitions (`*`, `+`, `{n,}`) and wide ranges repeat at most
/// `max_repeat` times beyond their minimum. Classes prefer printable ASCII.
/// Returns `None` when the pattern does not parse.
pub(crate) fn generate<R: Rng + ?Sized>(
    pattern: &str,
    rng: &mut R,
    max_repeat: u32,
) -> Option<String> {
    let hir = regex_syntax::parse(pattern).ok()?;
    let mut out = Vec::new();
    emit(&hir, rng, max_repeat, &mut out);
    Some(String::from_utf8_lossy(&out).into_owned())
}

fn emit<R: Rng + ?Sized>(hir: &Hir, rng: &mut R, max_repeat: u32, out: &mut Vec<u8>) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => out.extend_from_slice(&literal.0),
        HirKind::Class(Class::Unicode(class)) => {
            if let Some(c) = pick_char(class, rng) {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
        HirKind::Class(Class::Bytes(class)) => {
            if let Some(b) = pick_byte(class, rng) {
                out.push(b);
            }
        }
        HirKind::Repetition(repetition) => {
            let ceiling = repetition.min.saturating_add(max_repeat);
            let max = repetition.max.map_or(ceiling, |max| max.min(ceiling));
            let count = rng.gen_range(repetition.min..=max.max(repetition.min));
            for _ in 0..count {
                emit(&repetition.sub, rng, max_repeat, out);
            }
        }
        HirKind::Capture(capture) => emit(&capture.sub, rng, max_repeat, out),
        HirKind::Concat(parts) => {
            for part in parts {
                emit(part, rng, max_repeat, out);
            }
        }
        HirKind::Alternation(branches) => {
            if let Some(branch) = branches.choose(rng) {
                emit(branch, rng, max_repeat, out);
            }
        }
    }
}

fn pick_char<R: Rng + ?Sized>(class: &ClassUnicode, rng: &mut R) -> Option<char> {
    let mut printable = class.clone();
    printable.intersect(&ClassUnicode::new([ClassUnicodeRange::new(' ', '~')]));
    let class = if printable.ranges().is_empty() {
        class
    } else {
        &printable
    };

    let size = |r: &ClassUnicodeRange| r.end() as u32 - r.start() as u32 + 1;
    let total: u32 = class.ranges().iter().map(size).sum();
    if total == 0 {
        return None;
    }
    let mut offset = rng.gen_range(0..total);
    for range in class.ranges() {
        if offset < size(range) {
            return char::from_u32(range.start() as u32 + offset).or(Some(range.start()));
        }
        offset -= size(range);
    }
    None
}

fn pick_byte<R: Rng + ?Sized>(class: &ClassBytes, rng: &mut R) -> Option<u8> {
    let mut printable = class.clone();
    printable.intersect(&ClassBytes::new([ClassBytesRange::new(b' ', b'~')]));
    let class = if printable.ranges().is_empty() {
        class
    } else {
        &printable
    };

    let size = |r: &ClassBytesRange| u32::from(r.end()) - u32::from(r.start()) + 1;
    let total: u32 = class.ranges().iter().map(size).sum();
    if total == 0 {
        return None;
    }
    let mut offset = rng.gen_range(0..total);
    for range in class.ranges() {
        if offset < size(range) {
            return u8::try_from(u32::from(range.start()) + offset).ok();
        }
        offset -= size(range);
    }
    None
}
