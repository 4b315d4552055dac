use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::model::{Difficulty, Point, Question, QuestionError, ShapeDescriptor};
use crate::options::{self, NumericParams, OptionSetError};

/// π as taught at this level; explanations print the same constant so the
/// displayed derivation always agrees with the answer key.
const APPROX_PI: f64 = 3.14;

/// (a, b, c) right-triangle side lengths with a² + b² = c².
const PYTHAGOREAN_TRIPLES: [(u32, u32, u32); 5] = [
    (3, 4, 5),
    (5, 12, 13),
    (6, 8, 10),
    (8, 15, 17),
    (7, 24, 25),
];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no question template supports difficulty {difficulty}")]
    NoTemplate { difficulty: Difficulty },

    #[error(transparent)]
    Options(#[from] OptionSetError),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── TEMPLATE REGISTRY ─────────────────────────────────────────────────────────
//

const EASY_UP: &[Difficulty] = &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
const MEDIUM_UP: &[Difficulty] = &[Difficulty::Medium, Difficulty::Hard];
const HARD_ONLY: &[Difficulty] = &[Difficulty::Hard];

/// Identifier of a question template.
///
/// Each variant maps to a pure generation function of difficulty plus
/// randomness; there is no runtime registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    RectangleArea,
    RectanglePerimeter,
    TriangleArea,
    TrianglePerimeter,
    CircleArea,
    CircleCircumference,
    TrapezoidArea,
    PointTranslation,
    CompositeArea,
}

impl TemplateId {
    pub const ALL: [TemplateId; 9] = [
        TemplateId::RectangleArea,
        TemplateId::RectanglePerimeter,
        TemplateId::TriangleArea,
        TemplateId::TrianglePerimeter,
        TemplateId::CircleArea,
        TemplateId::CircleCircumference,
        TemplateId::TrapezoidArea,
        TemplateId::PointTranslation,
        TemplateId::CompositeArea,
    ];

    /// Difficulty levels this template can be asked at.
    #[must_use]
    pub fn difficulties(self) -> &'static [Difficulty] {
        match self {
            TemplateId::RectangleArea
            | TemplateId::RectanglePerimeter
            | TemplateId::TriangleArea => EASY_UP,
            TemplateId::TrianglePerimeter
            | TemplateId::CircleArea
            | TemplateId::CircleCircumference
            | TemplateId::TrapezoidArea
            | TemplateId::PointTranslation => MEDIUM_UP,
            TemplateId::CompositeArea => HARD_ONLY,
        }
    }

    #[must_use]
    pub fn supports(self, difficulty: Difficulty) -> bool {
        self.difficulties().contains(&difficulty)
    }

    /// All templates applicable at the given difficulty.
    #[must_use]
    pub fn supporting(difficulty: Difficulty) -> Vec<TemplateId> {
        Self::ALL
            .iter()
            .copied()
            .filter(|template| template.supports(difficulty))
            .collect()
    }

    /// Instantiate this template at the given difficulty.
    ///
    /// # Errors
    ///
    /// Propagates distractor-synthesis exhaustion and question invariant
    /// violations, both of which indicate a template bug rather than a
    /// recoverable condition.
    pub fn generate<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        difficulty: Difficulty,
    ) -> Result<Question, CatalogError> {
        match self {
            TemplateId::RectangleArea => rectangle_area(rng, difficulty),
            TemplateId::RectanglePerimeter => rectangle_perimeter(rng, difficulty),
            TemplateId::TriangleArea => triangle_area(rng, difficulty),
            TemplateId::TrianglePerimeter => triangle_perimeter(rng, difficulty),
            TemplateId::CircleArea => circle_area(rng, difficulty),
            TemplateId::CircleCircumference => circle_circumference(rng, difficulty),
            TemplateId::TrapezoidArea => trapezoid_area(rng, difficulty),
            TemplateId::PointTranslation => point_translation(rng, difficulty),
            TemplateId::CompositeArea => composite_area(rng),
        }
    }
}

/// Pick a template supporting `difficulty` uniformly at random and
/// instantiate it.
///
/// # Errors
///
/// Returns `CatalogError::NoTemplate` if no template supports the
/// difficulty, and propagates generation failures.
pub fn generate_question<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let pool = TemplateId::supporting(difficulty);
    let template = pool
        .choose(rng)
        .copied()
        .ok_or(CatalogError::NoTemplate { difficulty })?;
    template.generate(rng, difficulty)
}

//
// ─── GENERATORS ────────────────────────────────────────────────────────────────
//

fn rectangle_area<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let max = match difficulty {
        Difficulty::Easy => 12,
        Difficulty::Medium => 15,
        Difficulty::Hard => 20,
    };
    let width = rng.random_range(3..=max);
    let height = rng.random_range(3..=max - 1);
    build_rectangle_area(rng, width, height)
}

fn build_rectangle_area<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
) -> Result<Question, CatalogError> {
    let area = width * height;
    let set = options::numeric_options(
        rng,
        f64::from(area),
        NumericParams {
            spread: (f64::from(area) * 0.4).round().max(8.0),
            digits: 0,
            suffix: " sq units",
            min: 2.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "What is the area of the rectangle?",
        format!("Area = width × height = {width} × {height} = {area} square units."),
        options,
        answer_index,
        answer_value,
        "Correct! You multiplied the side lengths.",
        format!("The correct area is {area} square units."),
        ShapeDescriptor::Rectangle { width, height },
    )?)
}

fn rectangle_perimeter<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let max = match difficulty {
        Difficulty::Easy => 12,
        Difficulty::Medium => 14,
        Difficulty::Hard => 18,
    };
    let width = rng.random_range(2..=max);
    let height = rng.random_range(2..=max);
    build_rectangle_perimeter(rng, width, height)
}

fn build_rectangle_perimeter<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
) -> Result<Question, CatalogError> {
    let perimeter = 2 * (width + height);
    let set = options::numeric_options(
        rng,
        f64::from(perimeter),
        NumericParams {
            spread: (f64::from(perimeter) * 0.3).round().max(6.0),
            digits: 0,
            suffix: " units",
            min: 4.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "What is the perimeter of the rectangle?",
        format!("Perimeter = 2(w + h) = 2({width} + {height}) = {perimeter} units."),
        options,
        answer_index,
        answer_value,
        "Exactly! You added all the sides.",
        format!("Add all four sides to get {perimeter} units."),
        ShapeDescriptor::Rectangle { width, height },
    )?)
}

fn triangle_area<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let max_base = match difficulty {
        Difficulty::Easy => 12,
        Difficulty::Medium => 16,
        Difficulty::Hard => 22,
    };
    let max_height = match difficulty {
        Difficulty::Easy | Difficulty::Medium => 12,
        Difficulty::Hard => 18,
    };
    let base = rng.random_range(4..=max_base);
    let height = rng.random_range(3..=max_height);
    build_triangle_area(rng, base, height)
}

fn build_triangle_area<R: Rng + ?Sized>(
    rng: &mut R,
    base: u32,
    height: u32,
) -> Result<Question, CatalogError> {
    let area = 0.5 * f64::from(base) * f64::from(height);
    let set = options::numeric_options(
        rng,
        area,
        NumericParams {
            spread: (area * 0.5).round().max(6.0),
            digits: 1,
            suffix: " sq units",
            min: 2.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "What is the area of the triangle?",
        format!("Area = 1/2 × base × height = 0.5 × {base} × {height} = {area:.1} square units."),
        options,
        answer_index,
        answer_value,
        "Nice! Triangles use half of base × height.",
        format!("Remember 1/2 × {base} × {height} = {area:.1} square units."),
        ShapeDescriptor::RightTriangle {
            base,
            height,
            hypotenuse: None,
        },
    )?)
}

fn triangle_perimeter<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let index = if difficulty == Difficulty::Hard {
        rng.random_range(1..PYTHAGOREAN_TRIPLES.len())
    } else {
        rng.random_range(0..3)
    };
    let scale = if difficulty == Difficulty::Hard {
        rng.random_range(1..=3)
    } else {
        rng.random_range(1..=2)
    };
    let (a, b, c) = PYTHAGOREAN_TRIPLES[index];
    build_triangle_perimeter(rng, a * scale, b * scale, c * scale)
}

fn build_triangle_perimeter<R: Rng + ?Sized>(
    rng: &mut R,
    a: u32,
    b: u32,
    c: u32,
) -> Result<Question, CatalogError> {
    let perimeter = a + b + c;
    let set = options::numeric_options(
        rng,
        f64::from(perimeter),
        NumericParams {
            spread: (f64::from(perimeter) * 0.3).round().max(8.0),
            digits: 0,
            suffix: " units",
            min: 6.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "What is the perimeter of the right triangle?",
        format!("Perimeter = {a} + {b} + {c} = {perimeter} units."),
        options,
        answer_index,
        answer_value,
        "Great! You added all three sides.",
        format!("Add {a}, {b}, and {c} to get {perimeter} units."),
        ShapeDescriptor::RightTriangle {
            base: a,
            height: b,
            hypotenuse: Some(c),
        },
    )?)
}

fn circle_area<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let max = if difficulty == Difficulty::Hard { 14 } else { 10 };
    let radius = rng.random_range(3..=max);
    build_circle_area(rng, radius)
}

fn build_circle_area<R: Rng + ?Sized>(rng: &mut R, radius: u32) -> Result<Question, CatalogError> {
    let area = APPROX_PI * f64::from(radius) * f64::from(radius);
    let rounded = (area * 10.0).round() / 10.0;
    let set = options::numeric_options(
        rng,
        rounded,
        NumericParams {
            spread: (rounded * 0.35).round().max(10.0),
            digits: 1,
            suffix: " sq units",
            min: 10.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "Use π ≈ 3.14. What is the area of the circle?",
        format!("Area = πr² = 3.14 × {radius}² ≈ {rounded:.1} square units."),
        options,
        answer_index,
        answer_value,
        "Exactly! Multiply π by the radius squared.",
        format!("Compute 3.14 × {radius} × {radius} ≈ {rounded:.1} square units."),
        ShapeDescriptor::Circle { radius },
    )?)
}

fn circle_circumference<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let max = if difficulty == Difficulty::Hard { 16 } else { 12 };
    let radius = rng.random_range(3..=max);
    build_circle_circumference(rng, radius)
}

fn build_circle_circumference<R: Rng + ?Sized>(
    rng: &mut R,
    radius: u32,
) -> Result<Question, CatalogError> {
    let circumference = 2.0 * APPROX_PI * f64::from(radius);
    let rounded = (circumference * 10.0).round() / 10.0;
    let set = options::numeric_options(
        rng,
        rounded,
        NumericParams {
            spread: (rounded * 0.3).round().max(8.0),
            digits: 1,
            suffix: " units",
            min: 15.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "Use π ≈ 3.14. What is the circumference of the circle?",
        format!("Circumference = 2πr = 2 × 3.14 × {radius} ≈ {rounded:.1} units."),
        options,
        answer_index,
        answer_value,
        "Yes! Circumference equals 2π times the radius.",
        format!("Multiply 2 × 3.14 × {radius} to get {rounded:.1} units."),
        ShapeDescriptor::Circle { radius },
    )?)
}

fn trapezoid_area<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let max_base = if difficulty == Difficulty::Hard { 20 } else { 14 };
    let max_height = if difficulty == Difficulty::Hard { 14 } else { 10 };
    let base_bottom = rng.random_range(6..=max_base);
    let base_top = rng.random_range(4..=base_bottom - 1);
    let height = rng.random_range(4..=max_height);
    build_trapezoid_area(rng, base_bottom, base_top, height)
}

fn build_trapezoid_area<R: Rng + ?Sized>(
    rng: &mut R,
    base_bottom: u32,
    base_top: u32,
    height: u32,
) -> Result<Question, CatalogError> {
    let area = 0.5 * f64::from(base_bottom + base_top) * f64::from(height);
    let rounded = (area * 10.0).round() / 10.0;
    let set = options::numeric_options(
        rng,
        rounded,
        NumericParams {
            spread: (rounded * 0.35).round().max(10.0),
            digits: 1,
            suffix: " sq units",
            min: 12.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "What is the area of the trapezoid?",
        format!(
            "Area = 1/2 × ({base_bottom} + {base_top}) × {height} ≈ {rounded:.1} square units."
        ),
        options,
        answer_index,
        answer_value,
        "Correct! Average the bases, then multiply by height.",
        format!(
            "Compute 0.5 × ({base_bottom} + {base_top}) × {height} ≈ {rounded:.1} square units."
        ),
        ShapeDescriptor::Trapezoid {
            base_bottom,
            base_top,
            height,
        },
    )?)
}

fn point_translation<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
) -> Result<Question, CatalogError> {
    let range = if difficulty == Difficulty::Hard { 6 } else { 4 };
    let point = Point::new(
        rng.random_range(-range..=range),
        rng.random_range(-range..=range),
    );
    let vector = sample_translation_vector(rng);
    build_point_translation(rng, point, vector)
}

/// The identity translation would make the prompt trivial.
fn sample_translation_vector<R: Rng + ?Sized>(rng: &mut R) -> Point {
    loop {
        let vector = Point::new(rng.random_range(-3..=4), rng.random_range(-3..=4));
        if vector != Point::new(0, 0) {
            return vector;
        }
    }
}

fn build_point_translation<R: Rng + ?Sized>(
    rng: &mut R,
    point: Point,
    vector: Point,
) -> Result<Question, CatalogError> {
    let image = point.translated(vector);
    let set = options::coordinate_options(rng, image, 3)?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        format!(
            "Point P({}, {}) is translated by vector ({}, {}). Where is P'?",
            point.x, point.y, vector.x, vector.y
        ),
        format!(
            "Add the vector: ({} + {}, {} + {}) = ({}, {}).",
            point.x, vector.x, point.y, vector.y, image.x, image.y
        ),
        options,
        answer_index,
        answer_value,
        "Nice! You added each component of the vector.",
        format!(
            "Translate by adding {} and {} to get ({}, {}).",
            vector.x, vector.y, image.x, image.y
        ),
        ShapeDescriptor::Translation {
            point,
            vector,
            image,
        },
    )?)
}

fn composite_area<R: Rng + ?Sized>(rng: &mut R) -> Result<Question, CatalogError> {
    let outer_width = rng.random_range(16..=24);
    let outer_height = rng.random_range(12..=18);
    let cut_width = rng.random_range(5..=outer_width / 2);
    let cut_height = rng.random_range(4..=outer_height / 2);
    build_composite_area(rng, outer_width, outer_height, cut_width, cut_height)
}

fn build_composite_area<R: Rng + ?Sized>(
    rng: &mut R,
    outer_width: u32,
    outer_height: u32,
    cut_width: u32,
    cut_height: u32,
) -> Result<Question, CatalogError> {
    let area = outer_width * outer_height - cut_width * cut_height;
    let set = options::numeric_options(
        rng,
        f64::from(area),
        NumericParams {
            spread: (f64::from(area) * 0.25).round().max(12.0),
            digits: 0,
            suffix: " sq units",
            min: 20.0,
        },
    )?;
    let (options, answer_index, answer_value) = set.into_parts();

    Ok(Question::new(
        "What is the area of the L-shaped figure?",
        format!(
            "Subtract the missing rectangle: {outer_width}×{outer_height} − {cut_width}×{cut_height} = {area} square units."
        ),
        options,
        answer_index,
        answer_value,
        "Correct! Subtract the missing part from the large rectangle.",
        format!(
            "Take {outer_width}×{outer_height} minus {cut_width}×{cut_height} for {area} square units."
        ),
        ShapeDescriptor::CompositeL {
            outer_width,
            outer_height,
            cut_width,
            cut_height,
        },
    )?)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn easy_pool_holds_the_three_basic_templates() {
        assert_eq!(
            TemplateId::supporting(Difficulty::Easy),
            vec![
                TemplateId::RectangleArea,
                TemplateId::RectanglePerimeter,
                TemplateId::TriangleArea,
            ]
        );
    }

    #[test]
    fn hard_pool_holds_every_template() {
        assert_eq!(TemplateId::supporting(Difficulty::Hard).len(), TemplateId::ALL.len());
    }

    #[test]
    fn composite_is_hard_only() {
        assert!(!TemplateId::CompositeArea.supports(Difficulty::Easy));
        assert!(!TemplateId::CompositeArea.supports(Difficulty::Medium));
        assert!(TemplateId::CompositeArea.supports(Difficulty::Hard));
    }

    #[test]
    fn every_template_generates_valid_questions() {
        for template in TemplateId::ALL {
            for &difficulty in template.difficulties() {
                for seed in 0..10 {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let question = template.generate(&mut rng, difficulty).unwrap();
                    assert_eq!(question.options().len(), 4, "{template:?} at {difficulty}");
                    assert!(question.is_correct(question.answer_value()));
                    assert!(!question.prompt().is_empty());
                    assert!(!question.explanation().is_empty());
                }
            }
        }
    }

    #[test]
    fn generate_question_picks_from_the_difficulty_pool() {
        let easy_prompts = [
            "What is the area of the rectangle?",
            "What is the perimeter of the rectangle?",
            "What is the area of the triangle?",
        ];
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let question = generate_question(&mut rng, Difficulty::Easy).unwrap();
            assert!(easy_prompts.contains(&question.prompt()), "{}", question.prompt());
        }
    }

    #[test]
    fn rectangle_area_explains_the_multiplication() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_rectangle_area(&mut rng, 6, 4).unwrap();

        assert!(question.explanation().contains("6 × 4 = 24"));
        assert_eq!(question.answer_value(), "24");
        assert!(question.feedback_error().contains("24"));
        assert_eq!(
            *question.shape(),
            ShapeDescriptor::Rectangle {
                width: 6,
                height: 4
            }
        );
    }

    #[test]
    fn rectangle_perimeter_adds_the_sides() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_rectangle_perimeter(&mut rng, 3, 4).unwrap();
        assert!(question.explanation().contains("2(3 + 4) = 14"));
        assert_eq!(question.answer_value(), "14");
    }

    #[test]
    fn triangle_area_uses_half_base_times_height() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_triangle_area(&mut rng, 7, 5).unwrap();
        assert!(question.explanation().contains("0.5 × 7 × 5 = 17.5"));
        assert_eq!(question.answer_value(), "17.5");
    }

    #[test]
    fn triangle_perimeter_sums_the_triple() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_triangle_perimeter(&mut rng, 6, 8, 10).unwrap();
        assert!(question.explanation().contains("6 + 8 + 10 = 24"));
        assert_eq!(question.answer_value(), "24");
        assert_eq!(
            *question.shape(),
            ShapeDescriptor::RightTriangle {
                base: 6,
                height: 8,
                hypotenuse: Some(10)
            }
        );
    }

    #[test]
    fn circle_area_uses_the_approximate_pi() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_circle_area(&mut rng, 5).unwrap();
        assert_eq!(question.answer_value(), "78.5");
        assert!(question.explanation().contains("3.14 × 5²"));
        assert!(question.explanation().contains("78.5"));
    }

    #[test]
    fn circle_circumference_doubles_pi_r() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_circle_circumference(&mut rng, 4).unwrap();
        assert_eq!(question.answer_value(), "25.1");
        assert!(question.explanation().contains("2 × 3.14 × 4"));
    }

    #[test]
    fn trapezoid_area_averages_the_bases() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_trapezoid_area(&mut rng, 10, 6, 5).unwrap();
        assert_eq!(question.answer_value(), "40.0");
        assert!(question.explanation().contains("1/2 × (10 + 6) × 5"));
    }

    #[test]
    fn translation_adds_vector_components() {
        let mut rng = StdRng::seed_from_u64(5);
        let question =
            build_point_translation(&mut rng, Point::new(1, 2), Point::new(3, -1)).unwrap();
        assert_eq!(question.answer_value(), "4,1");
        assert!(question.prompt().contains("P(1, 2)"));
        assert!(question.prompt().contains("(3, -1)"));
        assert!(question.explanation().contains("(4, 1)"));
    }

    #[test]
    fn translation_vector_is_never_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            assert_ne!(sample_translation_vector(&mut rng), Point::new(0, 0));
        }
    }

    #[test]
    fn composite_area_subtracts_the_cut() {
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_composite_area(&mut rng, 20, 14, 6, 5).unwrap();
        assert_eq!(question.answer_value(), "250");
        assert!(question.explanation().contains("20×14 − 6×5 = 250"));
    }
}
