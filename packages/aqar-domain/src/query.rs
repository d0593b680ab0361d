//! Natural-language query parsing. Every extractor is a pure function over
//! the lowered text that returns the extracted value together with the byte
//! spans it claimed; the residual keyword is whatever no extractor claimed,
//! minus stopwords. Malformed input never fails, it just yields fewer hints.

use regex::Regex;

use crate::vocab::{self, Purpose};

/// Number portion of a price expression: digits with optional thousands
/// separators and decimals, then an optional magnitude suffix. Two capture
/// groups per occurrence.
const AMOUNT: &str = r"([0-9]+(?:,[0-9]{3})*(?:\.[0-9]+)?)\s*(thousand|million|mn|k|m)?\b";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryHints {
	pub bedrooms: Option<u8>,
	pub bathrooms: Option<u8>,
	pub price_min: Option<i64>,
	pub price_max: Option<i64>,
	pub property_type_ids: Vec<i32>,
	pub features: Vec<String>,
	pub purpose: Option<Purpose>,
	pub location: Option<String>,
	pub keyword: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Span {
	start: usize,
	end: usize,
}

impl Span {
	fn overlaps(&self, other: &Span) -> bool {
		self.start < other.end && other.start < self.end
	}
}

pub fn parse(text: &str) -> QueryHints {
	// ASCII-only lowering keeps byte offsets aligned with the caller's
	// text, so spans can slice the original for case-preserving output.
	let lowered: String = text.chars().map(|ch| ch.to_ascii_lowercase()).collect();
	let mut hints = QueryHints::default();
	let mut consumed: Vec<Span> = Vec::new();

	let (bedrooms, spans) = extract_bedrooms(&lowered, &consumed);

	hints.bedrooms = bedrooms;
	consumed.extend(spans);

	let (bathrooms, spans) = extract_bathrooms(&lowered, &consumed);

	hints.bathrooms = bathrooms;
	consumed.extend(spans);

	let (price_min, price_max, spans) = extract_price(&lowered, &consumed);

	hints.price_min = price_min;
	hints.price_max = price_max;
	consumed.extend(spans);

	let (property_type_ids, spans) = extract_property_types(&lowered, &consumed);

	hints.property_type_ids = property_type_ids;
	consumed.extend(spans);

	let (features, spans) = extract_features(&lowered, &consumed);

	hints.features = features;
	consumed.extend(spans);

	let (purpose, spans) = extract_purpose(&lowered, &consumed);

	hints.purpose = purpose;
	consumed.extend(spans);

	let (location, spans) = extract_location(text, &lowered, &consumed);

	hints.location = location;
	consumed.extend(spans);

	if hints.location.is_none() {
		let (location, spans) = fallback_location(text, &lowered, &consumed);

		hints.location = location;
		consumed.extend(spans);
	}

	hints.keyword = residual_keyword(text, &lowered, &consumed);

	hints
}

fn claimed(consumed: &[Span], span: Span) -> bool {
	consumed.iter().any(|existing| existing.overlaps(&span))
}

fn extract_bedrooms(lowered: &str, consumed: &[Span]) -> (Option<u8>, Vec<Span>) {
	let mut value = None;
	let mut spans = Vec::new();

	if let Ok(counted) = Regex::new(r"\b([0-9]{1,2})[\s-]*(?:bed(?:room)?s?|br)\b") {
		for captures in counted.captures_iter(lowered) {
			let (Some(whole), Some(digits)) = (captures.get(0), captures.get(1)) else {
				continue;
			};
			let span = Span { start: whole.start(), end: whole.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if value.is_none() {
				value = digits.as_str().parse().ok();
			}
		}
	}
	if let Ok(studio) = Regex::new(r"\bstudios?\b") {
		for found in studio.find_iter(lowered) {
			let span = Span { start: found.start(), end: found.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if value.is_none() {
				value = Some(0);
			}
		}
	}

	(value, spans)
}

fn extract_bathrooms(lowered: &str, consumed: &[Span]) -> (Option<u8>, Vec<Span>) {
	let mut value = None;
	let mut spans = Vec::new();

	if let Ok(counted) = Regex::new(r"\b([0-9]{1,2})[\s-]*bath(?:room)?s?\b") {
		for captures in counted.captures_iter(lowered) {
			let (Some(whole), Some(digits)) = (captures.get(0), captures.get(1)) else {
				continue;
			};
			let span = Span { start: whole.start(), end: whole.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if value.is_none() {
				value = digits.as_str().parse().ok();
			}
		}
	}

	(value, spans)
}

fn extract_price(lowered: &str, consumed: &[Span]) -> (Option<i64>, Option<i64>, Vec<Span>) {
	let mut price_min = None;
	let mut price_max = None;
	let mut spans: Vec<Span> = Vec::new();

	// "between X and Y" binds both bounds at once, so it runs first.
	if let Ok(between) = Regex::new(
		&[r"\bbetween\s+(?:aed\s*)?", AMOUNT, r"\s+and\s+(?:aed\s*)?", AMOUNT, r"(?:\s*aed\b)?"]
			.concat(),
	) {
		for captures in between.captures_iter(lowered) {
			let Some(whole) = captures.get(0) else {
				continue;
			};
			let span = Span { start: whole.start(), end: whole.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if price_min.is_none()
				&& price_max.is_none()
				&& let (Some(low), Some(high)) = (amount_at(&captures, 1), amount_at(&captures, 3))
			{
				price_min = Some(low.min(high));
				price_max = Some(low.max(high));
			}
		}
	}
	if let Ok(range) = Regex::new(
		&[r"\b", AMOUNT, r"\s*(?:-|to)\s*(?:aed\s*)?", AMOUNT, r"(?:\s*aed\b)?"].concat(),
	) {
		for captures in range.captures_iter(lowered) {
			let Some(whole) = captures.get(0) else {
				continue;
			};
			let span = Span { start: whole.start(), end: whole.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			let (Some(low), Some(high)) = (amount_at(&captures, 1), amount_at(&captures, 3))
			else {
				continue;
			};

			// A bare "2 to 5" is more likely a count than a price; only
			// magnitude suffixes or amounts in the thousands qualify.
			let has_suffix = captures.get(2).is_some() || captures.get(4).is_some();

			if !has_suffix && (low < 10_000 || high < 10_000) {
				continue;
			}

			spans.push(span);

			if price_min.is_none() && price_max.is_none() {
				price_min = Some(low.min(high));
				price_max = Some(low.max(high));
			}
		}
	}
	if let Ok(upper) = Regex::new(
		&[
			r"\b(?:under|below|upto|up\s+to|within|max(?:imum)?|at\s+most|less\s+than)\s+(?:aed\s*)?",
			AMOUNT,
			r"(?:\s*aed\b)?",
		]
		.concat(),
	) {
		for captures in upper.captures_iter(lowered) {
			let Some(whole) = captures.get(0) else {
				continue;
			};
			let span = Span { start: whole.start(), end: whole.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if price_max.is_none() {
				price_max = amount_at(&captures, 1);
			}
		}
	}
	if let Ok(lower) = Regex::new(
		&[
			r"\b(?:starting\s+(?:at|from)|more\s+than|at\s+least|over|above|min(?:imum)?|from)\s+(?:aed\s*)?",
			AMOUNT,
			r"(?:\s*aed\b)?",
		]
		.concat(),
	) {
		for captures in lower.captures_iter(lowered) {
			let Some(whole) = captures.get(0) else {
				continue;
			};
			let span = Span { start: whole.start(), end: whole.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if price_min.is_none() {
				price_min = amount_at(&captures, 1);
			}
		}
	}

	(price_min, price_max, spans)
}

fn extract_property_types(lowered: &str, consumed: &[Span]) -> (Vec<i32>, Vec<Span>) {
	let mut ids = Vec::new();
	let mut spans = Vec::new();

	for &(word, id) in vocab::property_type_words() {
		let Ok(exact) = Regex::new(&[r"\b", &regex::escape(word), r"\b"].concat()) else {
			continue;
		};

		for found in exact.find_iter(lowered) {
			let span = Span { start: found.start(), end: found.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if !ids.contains(&id) {
				ids.push(id);
			}
		}
	}

	(ids, spans)
}

fn extract_features(lowered: &str, consumed: &[Span]) -> (Vec<String>, Vec<Span>) {
	let mut keys: Vec<String> = Vec::new();
	let mut spans = Vec::new();

	// Table order puts multi-word phrases before their single-word
	// fallbacks, so "swimming pool" wins over "pool" via the span check.
	for &(phrase, key) in vocab::feature_phrases() {
		let Ok(exact) = Regex::new(&[r"\b", &regex::escape(phrase), r"\b"].concat()) else {
			continue;
		};

		for found in exact.find_iter(lowered) {
			let span = Span { start: found.start(), end: found.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if !keys.iter().any(|existing| existing == key) {
				keys.push(key.to_string());
			}
		}
	}

	(keys, spans)
}

fn extract_purpose(lowered: &str, consumed: &[Span]) -> (Option<Purpose>, Vec<Span>) {
	let mut earliest: Option<(usize, Purpose)> = None;
	let mut spans = Vec::new();

	for &(phrase, purpose) in vocab::purpose_phrases() {
		let Ok(exact) = Regex::new(&[r"\b", &regex::escape(phrase), r"\b"].concat()) else {
			continue;
		};

		for found in exact.find_iter(lowered) {
			let span = Span { start: found.start(), end: found.end() };

			if claimed(consumed, span) || claimed(&spans, span) {
				continue;
			}

			spans.push(span);

			if earliest.map(|(start, _)| span.start < start).unwrap_or(true) {
				earliest = Some((span.start, purpose));
			}
		}
	}

	(earliest.map(|(_, purpose)| purpose), spans)
}

/// Explicit `in/near/at <phrase>` form. The phrase is clipped at the first
/// span another extractor claimed and ends at the first stopword, so "in
/// dubai marina with sea view" yields "dubai marina" once features took
/// theirs and "with" is reached.
fn extract_location(
	original: &str,
	lowered: &str,
	consumed: &[Span],
) -> (Option<String>, Vec<Span>) {
	let Ok(lead) = Regex::new(r"\b(?:in|near|at)\s+([a-z][a-z0-9' -]*)") else {
		return (None, Vec::new());
	};

	for captures in lead.captures_iter(lowered) {
		let (Some(whole), Some(phrase)) = (captures.get(0), captures.get(1)) else {
			continue;
		};
		let mut end = phrase.end();

		for span in consumed {
			if span.start >= phrase.start() && span.start < end {
				end = span.start;
			}
		}

		if claimed(consumed, Span { start: whole.start(), end }) {
			continue;
		}

		let mut kept: Vec<Span> = Vec::new();

		for span in tokens_with_spans(lowered) {
			if span.start < phrase.start() || span.end > end {
				continue;
			}

			let Some(trimmed) = trim_punctuation(lowered, span) else {
				continue;
			};

			if vocab::is_stopword(&lowered[trimmed.start..trimmed.end]) {
				if kept.is_empty() {
					continue;
				}

				break;
			}

			kept.push(trimmed);
		}

		let Some(last) = kept.last().copied() else {
			continue;
		};
		let text =
			kept.iter().map(|span| &original[span.start..span.end]).collect::<Vec<_>>().join(" ");

		return (Some(text), vec![Span { start: whole.start(), end: last.end }]);
	}

	(None, Vec::new())
}

/// Without an explicit location marker, one or two trailing unclaimed words
/// are read as a place name, never anything containing digits.
fn fallback_location(
	original: &str,
	lowered: &str,
	consumed: &[Span],
) -> (Option<String>, Vec<Span>) {
	let tokens = residual_spans(lowered, consumed);

	if tokens.is_empty() || tokens.len() > 2 {
		return (None, Vec::new());
	}
	if tokens
		.iter()
		.any(|span| lowered[span.start..span.end].chars().any(|ch| ch.is_ascii_digit()))
	{
		return (None, Vec::new());
	}

	let text =
		tokens.iter().map(|span| &original[span.start..span.end]).collect::<Vec<_>>().join(" ");

	(Some(text), tokens)
}

fn residual_keyword(original: &str, lowered: &str, consumed: &[Span]) -> Option<String> {
	let kept = residual_spans(lowered, consumed);

	if kept.is_empty() {
		return None;
	}

	Some(kept.iter().map(|span| &original[span.start..span.end]).collect::<Vec<_>>().join(" "))
}

fn residual_spans(lowered: &str, consumed: &[Span]) -> Vec<Span> {
	let mut kept = Vec::new();

	for span in tokens_with_spans(lowered) {
		let Some(trimmed) = trim_punctuation(lowered, span) else {
			continue;
		};

		if claimed(consumed, trimmed) {
			continue;
		}

		let word = &lowered[trimmed.start..trimmed.end];

		if vocab::is_stopword(word)
			|| vocab::purpose_phrases().iter().any(|(phrase, _)| *phrase == word)
		{
			continue;
		}

		kept.push(trimmed);
	}

	kept
}

fn tokens_with_spans(text: &str) -> Vec<Span> {
	let mut spans = Vec::new();
	let mut start: Option<usize> = None;

	for (index, ch) in text.char_indices() {
		if ch.is_whitespace() {
			if let Some(token_start) = start.take() {
				spans.push(Span { start: token_start, end: index });
			}
		} else if start.is_none() {
			start = Some(index);
		}
	}
	if let Some(token_start) = start {
		spans.push(Span { start: token_start, end: text.len() });
	}

	spans
}

fn trim_punctuation(text: &str, span: Span) -> Option<Span> {
	let is_edge = |ch: char| matches!(ch, ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '"');
	let token = &text[span.start..span.end];
	let stripped_front = token.trim_start_matches(is_edge);
	let start = span.start + (token.len() - stripped_front.len());
	let stripped = stripped_front.trim_end_matches(is_edge);

	if stripped.is_empty() {
		return None;
	}

	Some(Span { start, end: start + stripped.len() })
}

fn amount_at(captures: &regex::Captures<'_>, index: usize) -> Option<i64> {
	let digits = captures.get(index)?;
	let suffix = captures.get(index + 1).map(|found| found.as_str());

	parse_amount(digits.as_str(), suffix)
}

fn parse_amount(digits: &str, suffix: Option<&str>) -> Option<i64> {
	let value: f64 = digits.replace(',', "").parse().ok()?;
	let multiplier = match suffix {
		Some("k" | "thousand") => 1_000.0,
		Some("m" | "mn" | "million") => 1_000_000.0,
		_ => 1.0,
	};
	let scaled = value * multiplier;

	// Stay inside f64's exact integer range.
	if !scaled.is_finite() || scaled < 0.0 || scaled >= 9_007_199_254_740_992.0 {
		return None;
	}

	Some(scaled.round() as i64)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bath_count_type_location_and_price_cap_parse_together() {
		let hints = parse("2 bath apartment near Jumeirah under 1.5m");

		assert_eq!(hints.bathrooms, Some(2));
		assert_eq!(hints.bedrooms, None);
		assert_eq!(hints.property_type_ids, vec![1]);
		assert_eq!(hints.price_min, None);
		assert_eq!(hints.price_max, Some(1_500_000));
		assert_eq!(hints.location.as_deref(), Some("Jumeirah"));
		assert_eq!(hints.keyword, None);
	}

	#[test]
	fn bed_count_and_type_parse_without_price() {
		let hints = parse("3 bed villa");

		assert_eq!(hints.bedrooms, Some(3));
		assert_eq!(hints.property_type_ids, vec![2]);
		assert_eq!(hints.price_min, None);
		assert_eq!(hints.price_max, None);
		assert_eq!(hints.location, None);
		assert_eq!(hints.keyword, None);
	}

	#[test]
	fn studio_means_zero_bedrooms() {
		let hints = parse("studio in jvc");

		assert_eq!(hints.bedrooms, Some(0));
		assert_eq!(hints.location.as_deref(), Some("jvc"));
	}

	#[test]
	fn hyphenated_bed_count_parses() {
		assert_eq!(parse("2-bed flat").bedrooms, Some(2));
		assert_eq!(parse("2br flat").bedrooms, Some(2));
	}

	#[test]
	fn between_range_orders_its_bounds() {
		let hints = parse("villa between 6m and 4m");

		assert_eq!(hints.price_min, Some(4_000_000));
		assert_eq!(hints.price_max, Some(6_000_000));
	}

	#[test]
	fn bare_range_needs_magnitude_to_be_a_price() {
		let priced = parse("apartment 800k-1.2m");

		assert_eq!(priced.price_min, Some(800_000));
		assert_eq!(priced.price_max, Some(1_200_000));

		let counted = parse("2 to 5 bed villa");

		assert_eq!(counted.price_min, None);
		assert_eq!(counted.price_max, None);
		assert_eq!(counted.bedrooms, Some(5));
	}

	#[test]
	fn lower_bound_words_set_price_min() {
		assert_eq!(parse("villa over 2m").price_min, Some(2_000_000));
		assert_eq!(parse("villa from aed 1,500,000").price_min, Some(1_500_000));
		assert_eq!(parse("villa starting from 950k").price_min, Some(950_000));
	}

	#[test]
	fn purpose_words_resolve_and_stay_out_of_the_keyword() {
		let hints = parse("apartment for rent in dubai marina");

		assert_eq!(hints.purpose, Some(Purpose::Rent));
		assert_eq!(hints.location.as_deref(), Some("dubai marina"));
		assert_eq!(hints.keyword, None);
		assert_eq!(parse("villa for sale").purpose, Some(Purpose::Buy));
	}

	#[test]
	fn features_prefer_the_longest_phrase() {
		let hints = parse("villa with swimming pool and sea view");

		assert_eq!(
			hints.features,
			vec!["swimming_pool".to_string(), "sea_view".to_string()]
		);
	}

	#[test]
	fn location_phrase_stops_before_claimed_spans() {
		let hints = parse("furnished 2 bedroom flat in dubai marina with sea view under 90k");

		assert_eq!(hints.bedrooms, Some(2));
		assert_eq!(hints.property_type_ids, vec![1]);
		assert!(hints.features.contains(&"furnished".to_string()));
		assert!(hints.features.contains(&"sea_view".to_string()));
		assert_eq!(hints.price_max, Some(90_000));
		assert_eq!(hints.location.as_deref(), Some("dubai marina"));
		assert_eq!(hints.keyword, None);
	}

	#[test]
	fn trailing_words_become_the_location_without_a_marker() {
		let hints = parse("penthouse palm jumeirah");

		assert_eq!(hints.property_type_ids, vec![4]);
		assert_eq!(hints.location.as_deref(), Some("palm jumeirah"));
		assert_eq!(hints.keyword, None);
	}

	#[test]
	fn long_residuals_stay_keywords_not_locations() {
		let hints = parse("bright corner unit apartment");

		assert_eq!(hints.location, None);
		assert_eq!(hints.keyword.as_deref(), Some("bright corner unit"));
	}

	#[test]
	fn digits_never_become_a_location() {
		let hints = parse("tower 3");

		assert_eq!(hints.location, None);
		assert_eq!(hints.keyword.as_deref(), Some("tower 3"));
	}

	#[test]
	fn garbage_input_degrades_to_empty_hints() {
		assert_eq!(parse(""), QueryHints::default());
		assert_eq!(parse("?!.,;:"), QueryHints::default());
		assert_eq!(parse("   \t  "), QueryHints::default());
	}

	#[test]
	fn case_is_preserved_and_stopwords_end_the_place_name() {
		let hints = parse("Apartment near Palm Jumeirah with private garden");

		assert_eq!(hints.location.as_deref(), Some("Palm Jumeirah"));
		assert_eq!(hints.keyword.as_deref(), Some("private"));
	}
}
