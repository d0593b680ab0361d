use std::ops::Range;

/// Index ranges one result page covers in the featured tier and the rest
/// tier. Either range may be empty; both are half-open and already clamped
/// to the tier sizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlendPlan {
	pub featured: Range<usize>,
	pub rest: Range<usize>,
}

impl BlendPlan {
	pub fn is_empty(&self) -> bool {
		self.featured.is_empty() && self.rest.is_empty()
	}

	pub fn len(&self) -> usize {
		self.featured.len() + self.rest.len()
	}
}

/// Maps a page onto the two tiers. Featured listings occupy one contiguous
/// prefix of the overall sequence and rest listings the suffix, so a page is
/// either fully featured, fully rest, or straddles the boundary once.
/// Concatenating the plans for pages `1, 2, ..` yields every item of both
/// tiers exactly once, in order.
pub fn blend(featured_count: usize, rest_count: usize, page_size: usize, page: usize) -> BlendPlan {
	let offset = page.saturating_sub(1).saturating_mul(page_size);

	if page_size == 0 {
		return BlendPlan { featured: 0..0, rest: 0..0 };
	}
	if offset.saturating_add(page_size) <= featured_count {
		// Entirely inside the featured tier.
		return BlendPlan { featured: offset..offset + page_size, rest: 0..0 };
	}
	if offset >= featured_count {
		// Entirely past the featured tier.
		let start = offset - featured_count;

		return BlendPlan { featured: 0..0, rest: clamped(start, page_size, rest_count) };
	}

	// Straddles the boundary: featured tail first, then the head of the rest
	// tier fills the remainder of the page.
	let take_rest = page_size - (featured_count - offset);

	BlendPlan { featured: offset..featured_count, rest: clamped(0, take_rest, rest_count) }
}

fn clamped(start: usize, len: usize, available: usize) -> Range<usize> {
	let start = start.min(available);

	start..start.saturating_add(len).min(available)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn straddling_page_takes_the_featured_tail_then_rest_head() {
		let plan = blend(7, 50, 10, 1);

		assert_eq!(plan, BlendPlan { featured: 0..7, rest: 0..3 });
		assert_eq!(plan.len(), 10);
	}

	#[test]
	fn pages_past_the_featured_tier_offset_into_rest() {
		assert_eq!(blend(7, 50, 10, 2), BlendPlan { featured: 0..0, rest: 3..13 });
		assert_eq!(blend(7, 50, 10, 3), BlendPlan { featured: 0..0, rest: 13..23 });
	}

	#[test]
	fn fully_featured_page_never_touches_rest() {
		assert_eq!(blend(25, 50, 10, 2), BlendPlan { featured: 10..20, rest: 0..0 });
	}

	#[test]
	fn exact_boundary_page_is_fully_featured() {
		assert_eq!(blend(20, 50, 10, 2), BlendPlan { featured: 10..20, rest: 0..0 });
		assert_eq!(blend(20, 50, 10, 3), BlendPlan { featured: 0..0, rest: 0..10 });
	}

	#[test]
	fn pages_beyond_the_end_are_empty() {
		assert!(blend(7, 50, 10, 7).is_empty());
		assert!(blend(0, 0, 10, 1).is_empty());
	}

	#[test]
	fn zero_page_size_yields_an_empty_plan() {
		assert!(blend(7, 50, 0, 1).is_empty());
	}

	#[test]
	fn page_sequence_reproduces_both_tiers_exactly_once() {
		for featured_count in 0..=13 {
			for rest_count in 0..=13 {
				for page_size in 1..=7 {
					let mut sequence = Vec::new();

					for page in 1.. {
						let plan = blend(featured_count, rest_count, page_size, page);

						if plan.is_empty() {
							break;
						}

						sequence.extend(plan.featured.map(|i| ("featured", i)));
						sequence.extend(plan.rest.map(|i| ("rest", i)));
					}

					let mut expected: Vec<(&str, usize)> =
						(0..featured_count).map(|i| ("featured", i)).collect();

					expected.extend((0..rest_count).map(|i| ("rest", i)));
					assert_eq!(
						sequence, expected,
						"featured={featured_count} rest={rest_count} page_size={page_size}"
					);
				}
			}
		}
	}

	#[test]
	fn six_pages_of_ten_cover_fifty_seven_items() {
		let mut total = 0;

		for page in 1..=6 {
			total += blend(7, 50, 10, page).len();
		}

		assert_eq!(total, 57);
		assert!(blend(7, 50, 10, 6).len() == 7);
	}
}
