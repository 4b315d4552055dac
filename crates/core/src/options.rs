use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::question::{OPTION_COUNT, QuestionOption};
use crate::model::shape::Point;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Hard cap on candidate draws; collisions are rare under sane parameters,
/// so hitting it means a template's ranges are too narrow.
const MAX_ATTEMPTS: usize = 64;

/// After this many fruitless draws the sampling window is widened.
const WIDEN_EVERY: usize = 16;

const WIDEN_FACTOR: f64 = 1.5;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum OptionSetError {
    #[error("failed to collect {OPTION_COUNT} distinct options after {attempts} draws")]
    Exhausted { attempts: usize },

    #[error("correct value {value} is below the option floor {min}")]
    CorrectBelowFloor { value: f64, min: f64 },
}

//
// ─── OPTION SET ────────────────────────────────────────────────────────────────
//

/// A shuffled set of exactly four answer choices, one of them correct.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    options: Vec<QuestionOption>,
    answer_index: usize,
    answer_value: String,
}

impl OptionSet {
    fn shuffled<R: Rng + ?Sized>(
        rng: &mut R,
        mut options: Vec<QuestionOption>,
        answer_value: String,
    ) -> Self {
        options.shuffle(rng);
        let answer_index = options
            .iter()
            .position(|option| option.value() == answer_value)
            .expect("the correct option is inserted before shuffling");
        Self {
            options,
            answer_index,
            answer_value,
        }
    }

    /// Options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    /// Index of the correct option after shuffling.
    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    /// Canonical value key of the correct option.
    #[must_use]
    pub fn answer_value(&self) -> &str {
        &self.answer_value
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<QuestionOption>, usize, String) {
        (self.options, self.answer_index, self.answer_value)
    }
}

//
// ─── NUMERIC OPTIONS ───────────────────────────────────────────────────────────
//

/// Sampling controls for numeric distractors.
///
/// `spread` (must be positive) bounds the distance of distractors from the
/// correct value, `digits` selects integer (0) or fixed-decimal rounding,
/// `suffix` is appended to display labels, and no option may fall below
/// `min`.
#[derive(Debug, Clone, Copy)]
pub struct NumericParams {
    pub spread: f64,
    pub digits: u8,
    pub suffix: &'static str,
    pub min: f64,
}

fn round_to(value: f64, digits: u8) -> f64 {
    let factor = 10f64.powi(i32::from(digits));
    (value * factor).round() / factor
}

fn format_value(value: f64, digits: u8) -> String {
    format!("{value:.prec$}", prec = usize::from(digits))
}

fn push_unique(options: &mut Vec<QuestionOption>, value: f64, digits: u8, suffix: &str) {
    let key = format_value(value, digits);
    if options.iter().any(|option| option.value() == key) {
        return;
    }
    let label = format!("{key}{suffix}");
    options.push(QuestionOption::new(label, key));
}

/// Build four distinct numeric options around `correct`.
///
/// Distractors are drawn as `correct + uniform(-spread, spread)`, rounded to
/// `digits`, resampled from `[min, min + spread)` when they land below the
/// floor, and deduplicated by formatted key. The returned set is uniformly
/// shuffled with the correct index reported.
///
/// # Errors
///
/// Returns `OptionSetError::CorrectBelowFloor` when the correct value itself
/// violates the floor, and `OptionSetError::Exhausted` when the bounded
/// resampling loop cannot reach four distinct keys.
pub fn numeric_options<R: Rng + ?Sized>(
    rng: &mut R,
    correct: f64,
    params: NumericParams,
) -> Result<OptionSet, OptionSetError> {
    let normalized = round_to(correct, params.digits);
    if normalized < params.min {
        return Err(OptionSetError::CorrectBelowFloor {
            value: normalized,
            min: params.min,
        });
    }
    let answer_value = format_value(normalized, params.digits);

    let mut options = Vec::with_capacity(OPTION_COUNT);
    push_unique(&mut options, normalized, params.digits, params.suffix);

    let mut spread = params.spread;
    let mut attempts = 0;
    while options.len() < OPTION_COUNT {
        if attempts >= MAX_ATTEMPTS {
            return Err(OptionSetError::Exhausted { attempts });
        }
        attempts += 1;
        if attempts % WIDEN_EVERY == 0 {
            spread *= WIDEN_FACTOR;
        }

        let mut candidate = normalized + rng.random_range(-spread..=spread);
        if candidate < params.min {
            candidate = params.min + rng.random_range(0.0..spread);
        }
        let value = round_to(candidate, params.digits);
        if value < params.min {
            continue;
        }
        push_unique(&mut options, value, params.digits, params.suffix);
    }

    Ok(OptionSet::shuffled(rng, options, answer_value))
}

//
// ─── COORDINATE OPTIONS ────────────────────────────────────────────────────────
//

fn coordinate_key(point: Point) -> String {
    format!("{},{}", point.x, point.y)
}

fn push_unique_point(options: &mut Vec<QuestionOption>, point: Point) {
    let key = coordinate_key(point);
    if options.iter().any(|option| option.value() == key) {
        return;
    }
    options.push(QuestionOption::new(point.to_string(), key));
}

/// Build four distinct coordinate options around `correct`.
///
/// Distractors are `(x + dx, y + dy)` with both offsets uniform in
/// `[-range, range]`, deduplicated by `"x,y"` key.
///
/// # Errors
///
/// Returns `OptionSetError::Exhausted` when the bounded resampling loop
/// cannot reach four distinct points.
pub fn coordinate_options<R: Rng + ?Sized>(
    rng: &mut R,
    correct: Point,
    range: i32,
) -> Result<OptionSet, OptionSetError> {
    let answer_value = coordinate_key(correct);

    let mut options = Vec::with_capacity(OPTION_COUNT);
    push_unique_point(&mut options, correct);

    let mut range = range;
    let mut attempts = 0;
    while options.len() < OPTION_COUNT {
        if attempts >= MAX_ATTEMPTS {
            return Err(OptionSetError::Exhausted { attempts });
        }
        attempts += 1;
        if attempts % WIDEN_EVERY == 0 {
            range += 1;
        }

        let dx = rng.random_range(-range..=range);
        let dy = rng.random_range(-range..=range);
        push_unique_point(&mut options, Point::new(correct.x + dx, correct.y + dy));
    }

    Ok(OptionSet::shuffled(rng, options, answer_value))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const PARAMS: NumericParams = NumericParams {
        spread: 8.0,
        digits: 0,
        suffix: " sq units",
        min: 2.0,
    };

    #[test]
    fn numeric_set_holds_invariants_across_seeds() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = numeric_options(&mut rng, 24.0, PARAMS).unwrap();

            assert_eq!(set.options().len(), 4);
            for (i, option) in set.options().iter().enumerate() {
                assert!(
                    !set.options()[..i].iter().any(|o| o.value() == option.value()),
                    "duplicate value {} (seed {seed})",
                    option.value()
                );
            }
            let matches = set
                .options()
                .iter()
                .filter(|o| o.value() == set.answer_value())
                .count();
            assert_eq!(matches, 1);
            assert_eq!(set.options()[set.answer_index()].value(), set.answer_value());
            assert_eq!(set.answer_value(), "24");
        }
    }

    #[test]
    fn numeric_options_respect_floor() {
        // A wide spread around a small correct value forces the resample path.
        let params = NumericParams {
            spread: 30.0,
            digits: 0,
            suffix: " units",
            min: 10.0,
        };
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = numeric_options(&mut rng, 12.0, params).unwrap();
            for option in set.options() {
                let value: f64 = option.value().parse().unwrap();
                assert!(value >= 10.0, "option {value} below floor (seed {seed})");
            }
        }
    }

    #[test]
    fn numeric_options_format_one_decimal() {
        let params = NumericParams {
            spread: 6.0,
            digits: 1,
            suffix: " sq units",
            min: 2.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let set = numeric_options(&mut rng, 37.68, params).unwrap();

        assert_eq!(set.answer_value(), "37.7");
        for option in set.options() {
            let (_, decimals) = option.value().split_once('.').unwrap();
            assert_eq!(decimals.len(), 1);
            assert!(option.label().ends_with(" sq units"));
        }
    }

    #[test]
    fn numeric_label_carries_suffix_and_key() {
        let mut rng = StdRng::seed_from_u64(3);
        let set = numeric_options(&mut rng, 24.0, PARAMS).unwrap();
        let answer = &set.options()[set.answer_index()];
        assert_eq!(answer.label(), "24 sq units");
    }

    #[test]
    fn correct_below_floor_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = numeric_options(&mut rng, 5.0, NumericParams { min: 10.0, ..PARAMS }).unwrap_err();
        assert!(matches!(err, OptionSetError::CorrectBelowFloor { .. }));
    }

    #[test]
    fn zero_spread_exhausts_instead_of_spinning() {
        let params = NumericParams {
            spread: 0.0,
            digits: 0,
            suffix: "",
            min: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = numeric_options(&mut rng, 10.0, params).unwrap_err();
        assert!(matches!(err, OptionSetError::Exhausted { attempts: MAX_ATTEMPTS }));
    }

    #[test]
    fn coordinate_set_holds_invariants_across_seeds() {
        let correct = Point::new(2, -1);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = coordinate_options(&mut rng, correct, 3).unwrap();

            assert_eq!(set.options().len(), 4);
            assert_eq!(set.answer_value(), "2,-1");
            assert_eq!(set.options()[set.answer_index()].value(), "2,-1");
            for (i, option) in set.options().iter().enumerate() {
                assert!(!set.options()[..i].iter().any(|o| o.value() == option.value()));
                let (x, y) = option.value().split_once(',').unwrap();
                let x: i32 = x.parse().unwrap();
                let y: i32 = y.parse().unwrap();
                assert!((x - correct.x).abs() <= 3, "x {x} outside range (seed {seed})");
                assert!((y - correct.y).abs() <= 3, "y {y} outside range (seed {seed})");
            }
        }
    }

    #[test]
    fn coordinate_labels_match_point_display() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = coordinate_options(&mut rng, Point::new(2, -1), 3).unwrap();
        let answer = &set.options()[set.answer_index()];
        assert_eq!(answer.label(), "(2, -1)");
    }
}
