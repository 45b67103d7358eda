//! Values for string formats and filler text.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::attribute::Format;

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "commodo",
];

pub(crate) fn word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    LOREM.choose(rng).copied().unwrap_or("lorem")
}

/// One to four words, padded with more words up to `min_length` characters
/// and cut at `max_length`.
pub(crate) fn lorem<R: Rng + ?Sized>(
    rng: &mut R,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> String {
    let min_length = min_length.unwrap_or(0);
    let words = rng.gen_range(1..=4);
    let mut out = String::new();
    let mut count = 0;
    while count < words || out.chars().count() < min_length {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word(rng));
        count += 1;
    }
    match max_length {
        Some(max) => out.chars().take(max).collect(),
        None => out,
    }
}

pub(crate) fn generate<R: Rng + ?Sized>(format: Format, rng: &mut R) -> String {
    match format {
        Format::Email => format!("{}.{}@example.com", word(rng), word(rng)),
        Format::Uri => format!("https://example.com/{}/{}", word(rng), word(rng)),
        Format::DateTime => date_time(rng),
        Format::Uuid => uuid(rng),
        Format::Ipv4 => format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=223),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        ),
        Format::Hostname => format!("{}.example.com", word(rng)),
    }
}

/// RFC 3339 timestamp between 1970 and 2033.
pub(crate) fn date_time<R: Rng + ?Sized>(rng: &mut R) -> String {
    let seconds = rng.gen_range(0..2_000_000_000i64);
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.r#gen())
        .into_uuid()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn lorem_respects_lengths() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let text = lorem(&mut rng, Some(30), Some(40));
            let len = text.chars().count();
            assert!((30..=40).contains(&len), "{text:?}");
        }
        assert_eq!(lorem(&mut rng, None, Some(0)), "");
    }

    #[test]
    fn formats_parse_back() {
        let mut rng = StdRng::seed_from_u64(9);
        let stamp = generate(Format::DateTime, &mut rng);
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());

        let id = generate(Format::Uuid, &mut rng);
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let ip = generate(Format::Ipv4, &mut rng);
        assert!(ip.parse::<std::net::Ipv4Addr>().is_ok());

        assert!(generate(Format::Email, &mut rng).contains('@'));
    }
}
