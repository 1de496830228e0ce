// Per-position weighted overall rating.

use super::player::Attributes;
use super::position::Position;

/// One row of per-attribute weights.
struct WeightRow {
    speed: f64,
    shooting: f64,
    passing: f64,
    dribbling: f64,
    physical: f64,
    defending: f64,
    goalkeeping: f64,
    weak_foot: f64,
}

const ST_WEIGHTS: WeightRow = WeightRow {
    speed: 0.25,
    shooting: 0.30,
    passing: 0.10,
    dribbling: 0.15,
    physical: 0.10,
    defending: 0.10,
    goalkeeping: 0.0,
    weak_foot: 0.10,
};

const MF_WEIGHTS: WeightRow = WeightRow {
    speed: 0.20,
    shooting: 0.20,
    passing: 0.25,
    dribbling: 0.20,
    physical: 0.10,
    defending: 0.10,
    goalkeeping: 0.0,
    weak_foot: 0.05,
};

const DF_WEIGHTS: WeightRow = WeightRow {
    speed: 0.10,
    shooting: 0.05,
    passing: 0.15,
    dribbling: 0.05,
    physical: 0.20,
    defending: 0.45,
    goalkeeping: 0.0,
    weak_foot: 0.03,
};

const GK_WEIGHTS: WeightRow = WeightRow {
    speed: 0.03,
    shooting: 0.0,
    passing: 0.02,
    dribbling: 0.0,
    physical: 0.05,
    defending: 0.0,
    goalkeeping: 0.90,
    weak_foot: 0.02,
};

fn weights_for(position: Position) -> &'static WeightRow {
    match position {
        Position::Striker => &ST_WEIGHTS,
        Position::Midfielder => &MF_WEIGHTS,
        Position::Defender => &DF_WEIGHTS,
        Position::Goalkeeper => &GK_WEIGHTS,
    }
}

/// NaN and infinite attribute values count as 0 rather than poisoning the sum.
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Compute a player's overall rating at the given position.
///
/// Pure weighted sum of the raw attributes, rounded to the nearest integer
/// (half up). Out-of-range attribute values are not clamped; they propagate
/// into the sum. Callers must recompute whenever the scoring position
/// changes -- the result is never cached here.
pub fn overall(attrs: &Attributes, position: Position) -> i32 {
    let w = weights_for(position);
    let sum = sanitize(attrs.speed) * w.speed
        + sanitize(attrs.shooting) * w.shooting
        + sanitize(attrs.passing) * w.passing
        + sanitize(attrs.dribbling) * w.dribbling
        + sanitize(attrs.physical) * w.physical
        + sanitize(attrs.defending) * w.defending
        + sanitize(attrs.goalkeeping) * w.goalkeeping
        + sanitize(attrs.weak_foot) * w.weak_foot;
    sum.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: f64) -> Attributes {
        Attributes {
            speed: value,
            shooting: value,
            passing: value,
            dribbling: value,
            physical: value,
            defending: value,
            goalkeeping: value,
            weak_foot: value,
        }
    }

    #[test]
    fn weight_rows_match_documented_totals() {
        let totals = [
            (&ST_WEIGHTS, 1.10),
            (&MF_WEIGHTS, 1.10),
            (&DF_WEIGHTS, 1.03),
            (&GK_WEIGHTS, 1.02),
        ];
        for (row, expected) in totals {
            let sum = row.speed
                + row.shooting
                + row.passing
                + row.dribbling
                + row.physical
                + row.defending
                + row.goalkeeping
                + row.weak_foot;
            assert!((sum - expected).abs() < 1e-9, "got {sum}, want {expected}");
        }
    }

    #[test]
    fn striker_reference_score() {
        // round(80*.25 + 80*.3 + 80*.1 + 80*.15 + 80*.1 + 80*.1 + 30*.1) = 83
        let attrs = Attributes {
            weak_foot: 30.0,
            goalkeeping: 0.0,
            ..flat(80.0)
        };
        assert_eq!(overall(&attrs, Position::Striker), 83);
    }

    #[test]
    fn deterministic_across_calls() {
        let attrs = Attributes {
            speed: 91.0,
            shooting: 74.0,
            passing: 66.0,
            dribbling: 83.0,
            physical: 58.0,
            defending: 42.0,
            goalkeeping: 11.0,
            weak_foot: 35.0,
        };
        let first = overall(&attrs, Position::Midfielder);
        for _ in 0..10 {
            assert_eq!(overall(&attrs, Position::Midfielder), first);
        }
    }

    #[test]
    fn goalkeeping_dominates_gk_score() {
        // With goalkeeping fixed, a 20-point speed swing moves the GK score
        // by at most 20 * 0.03 = 0.6 before rounding.
        let base = Attributes {
            goalkeeping: 70.0,
            ..flat(50.0)
        };
        let slow = Attributes { speed: 30.0, ..base };
        let fast = Attributes { speed: 70.0, ..base };
        let diff = (overall(&fast, Position::Goalkeeper) - overall(&slow, Position::Goalkeeper)).abs();
        assert!(diff <= 2, "speed should barely move a GK score, moved {diff}");
    }

    #[test]
    fn position_changes_the_score() {
        let attrs = Attributes {
            speed: 90.0,
            shooting: 88.0,
            passing: 60.0,
            dribbling: 85.0,
            physical: 70.0,
            defending: 30.0,
            goalkeeping: 5.0,
            weak_foot: 40.0,
        };
        let as_st = overall(&attrs, Position::Striker);
        let as_df = overall(&attrs, Position::Defender);
        assert!(as_st > as_df, "a natural striker profile should rate higher at ST");
    }

    #[test]
    fn nan_attributes_coerce_to_zero() {
        let attrs = Attributes {
            shooting: f64::NAN,
            ..flat(80.0)
        };
        let with_zero = Attributes {
            shooting: 0.0,
            ..flat(80.0)
        };
        assert_eq!(
            overall(&attrs, Position::Striker),
            overall(&with_zero, Position::Striker)
        );
    }

    #[test]
    fn all_zero_attributes_score_zero() {
        for pos in [
            Position::Goalkeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Striker,
        ] {
            assert_eq!(overall(&Attributes::default(), pos), 0);
        }
    }

    #[test]
    fn out_of_range_values_propagate() {
        let attrs = Attributes {
            goalkeeping: 200.0,
            ..Attributes::default()
        };
        assert_eq!(overall(&attrs, Position::Goalkeeper), 180);
    }
}
