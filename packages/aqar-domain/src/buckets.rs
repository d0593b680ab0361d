/// Canonical price buckets. Profile histograms are keyed by these labels and
/// boost synthesis renders filter clauses from their bounds, so both sides
/// must agree on the boundaries here.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PriceBucket {
	UnderOneMillion,
	OneToTwoMillion,
	TwoToFiveMillion,
	FiveMillionPlus,
}

impl PriceBucket {
	pub const ALL: [Self; 4] = [
		Self::UnderOneMillion,
		Self::OneToTwoMillion,
		Self::TwoToFiveMillion,
		Self::FiveMillionPlus,
	];

	/// Buckets every price; negative prices fall into the lowest bucket.
	pub fn of(price: i64) -> Self {
		if price < 1_000_000 {
			Self::UnderOneMillion
		} else if price < 2_000_000 {
			Self::OneToTwoMillion
		} else if price < 5_000_000 {
			Self::TwoToFiveMillion
		} else {
			Self::FiveMillionPlus
		}
	}

	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|bucket| bucket.label() == label)
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::UnderOneMillion => "0-1000000",
			Self::OneToTwoMillion => "1000000-2000000",
			Self::TwoToFiveMillion => "2000000-5000000",
			Self::FiveMillionPlus => "5000000+",
		}
	}

	/// Inclusive lower bound and exclusive upper bound, open-ended for the
	/// top bucket.
	pub fn bounds(&self) -> (i64, Option<i64>) {
		match self {
			Self::UnderOneMillion => (0, Some(1_000_000)),
			Self::OneToTwoMillion => (1_000_000, Some(2_000_000)),
			Self::TwoToFiveMillion => (2_000_000, Some(5_000_000)),
			Self::FiveMillionPlus => (5_000_000, None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn boundary_prices_land_in_the_expected_bucket() {
		assert_eq!(PriceBucket::of(999_999).label(), "0-1000000");
		assert_eq!(PriceBucket::of(1_000_000).label(), "1000000-2000000");
		assert_eq!(PriceBucket::of(1_999_999).label(), "1000000-2000000");
		assert_eq!(PriceBucket::of(2_000_000).label(), "2000000-5000000");
		assert_eq!(PriceBucket::of(5_000_000).label(), "5000000+");
		assert_eq!(PriceBucket::of(0).label(), "0-1000000");
		assert_eq!(PriceBucket::of(-1).label(), "0-1000000");
	}

	#[test]
	fn labels_round_trip() {
		for bucket in PriceBucket::ALL {
			assert_eq!(PriceBucket::from_label(bucket.label()), Some(bucket));
		}
		assert_eq!(PriceBucket::from_label("1-2m"), None);
	}

	#[test]
	fn bounds_partition_the_price_line() {
		let mut previous_upper = Some(0);

		for bucket in PriceBucket::ALL {
			let (lower, upper) = bucket.bounds();
			assert_eq!(Some(lower), previous_upper);
			previous_upper = upper;
		}
		assert_eq!(previous_upper, None);
	}
}
