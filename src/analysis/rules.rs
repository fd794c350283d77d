//! Priority-ordered rule tables for advisory tips and status classification.
//!
//! Each table is a list of `(predicate, outcome)` rows evaluated top to
//! bottom. Keeping the rows as data makes the precedence readable in one
//! place and lets each row be tested on its own.

use serde::{Serialize, Serializer};

// ---

/// Whether the room reacted to the first set-point change in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Responsiveness {
    /// No set-point change was seen, nothing to evaluate.
    NotEvaluated,
    Responded,
    DidNotRespond,
}

/// Derived values the rule tables read. Built once per analysis call.
#[derive(Debug, Clone, Copy)]
pub struct Signals {
    pub latest_set: f64,
    pub latest_actual: f64,
    pub outside_now: f64,
    pub temp_diff_outside: f64,
    pub actual_std_dev: f64,
    pub avg_deviation: f64,
    pub max_deviation: f64,
    pub setpoint_changed: bool,
    pub trend_positive: bool,
    pub responsiveness: Responsiveness,
}

/// Overall classification of a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Info,
    Warning,
}

/// Advisory tip attached to a verdict. Serializes as its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tip {
    OpenWindow,
    CloseBlinds,
    NaturalVentilation,
    KeepWindowsClosed,
    TargetOutsideComfortRange,
    StrongFluctuations,
}

impl Tip {
    pub fn message(self) -> &'static str {
        // ---
        match self {
            Tip::OpenWindow => "Open a window - the room is overheated and it is cooler outside.",
            Tip::CloseBlinds => "Close the blinds - strong heat gain from outside.",
            Tip::NaturalVentilation => {
                "Indoor and outdoor temperatures are similar - natural ventilation is possible."
            }
            Tip::KeepWindowsClosed => {
                "Better keep the windows closed - it is notably colder outside."
            }
            Tip::TargetOutsideComfortRange => {
                "Target temperature is outside the common room temperature range (18-24 °C)."
            }
            Tip::StrongFluctuations => {
                "Strong temperature fluctuations - check windows or thermostat."
            }
        }
    }
}

impl Serialize for Tip {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

pub const MSG_STRONG_DEVIATION: &str = "Strong deviation between target and actual temperature.";
pub const MSG_NOT_APPROACHING: &str = "Temperature is not approaching the target.";
pub const MSG_NOT_RESPONDING: &str = "Temperature is not responding to the new target.";
pub const MSG_STABLE: &str = "Temperature is stable within the target range.";
pub const MSG_APPROACHING: &str = "Temperature is approaching the target.";
pub const MSG_INCONCLUSIVE: &str = "Analysis inconclusive, but no anomaly detected.";

// ---

pub struct TipRule {
    pub applies: fn(&Signals) -> bool,
    pub tip: Tip,
}

pub struct StatusRule {
    pub applies: fn(&Signals) -> bool,
    pub status: Status,
    pub message: &'static str,
}

/// Indoor/outdoor climate tips. At most one of these fires.
pub const CLIMATE_TIPS: &[TipRule] = &[
    TipRule {
        applies: |s: &Signals| s.latest_actual > s.latest_set + 1.0 && s.temp_diff_outside > 2.0,
        tip: Tip::OpenWindow,
    },
    TipRule {
        applies: |s: &Signals| s.latest_actual < s.latest_set - 1.0 && s.outside_now > s.latest_set,
        tip: Tip::CloseBlinds,
    },
    TipRule {
        applies: |s: &Signals| s.temp_diff_outside.abs() < 0.5,
        tip: Tip::NaturalVentilation,
    },
    TipRule {
        applies: |s: &Signals| s.latest_actual < 20.0 && s.outside_now < 15.0,
        tip: Tip::KeepWindowsClosed,
    },
];

/// Tips checked on their own, each may fire regardless of the others.
pub const INDEPENDENT_TIPS: &[TipRule] = &[
    TipRule {
        applies: |s: &Signals| s.latest_set > 24.0 || s.latest_set < 18.0,
        tip: Tip::TargetOutsideComfortRange,
    },
    TipRule {
        applies: |s: &Signals| s.actual_std_dev > 1.5,
        tip: Tip::StrongFluctuations,
    },
];

/// Status cascade, first match wins. The last row always matches.
pub const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        applies: |s: &Signals| s.max_deviation > 2.0 && !s.setpoint_changed,
        status: Status::Warning,
        message: MSG_STRONG_DEVIATION,
    },
    StatusRule {
        applies: |s: &Signals| !s.trend_positive && s.max_deviation > 1.0,
        status: Status::Warning,
        message: MSG_NOT_APPROACHING,
    },
    StatusRule {
        applies: |s: &Signals| s.responsiveness == Responsiveness::DidNotRespond,
        status: Status::Warning,
        message: MSG_NOT_RESPONDING,
    },
    StatusRule {
        applies: |s: &Signals| s.avg_deviation < 1.0,
        status: Status::Ok,
        message: MSG_STABLE,
    },
    StatusRule {
        applies: |s: &Signals| s.trend_positive,
        status: Status::Info,
        message: MSG_APPROACHING,
    },
    StatusRule {
        applies: |_: &Signals| true,
        status: Status::Info,
        message: MSG_INCONCLUSIVE,
    },
];

/// Collect the tips that apply: first matching climate tip, then every
/// matching independent tip, in table order.
pub fn collect_tips(signals: &Signals) -> Vec<Tip> {
    // ---
    let climate = CLIMATE_TIPS.iter().find(|rule| (rule.applies)(signals));

    climate
        .into_iter()
        .chain(INDEPENDENT_TIPS.iter().filter(|rule| (rule.applies)(signals)))
        .map(|rule| rule.tip)
        .collect()
}

pub fn classify(signals: &Signals) -> (Status, &'static str) {
    // ---
    STATUS_RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map(|rule| (rule.status, rule.message))
        .unwrap_or((Status::Info, MSG_INCONCLUSIVE))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    /// Neutral signals: on target, mild outdoor difference, nothing fires
    /// except the `ok` status row.
    fn baseline() -> Signals {
        // ---
        Signals {
            latest_set: 21.0,
            latest_actual: 21.0,
            outside_now: 16.0,
            temp_diff_outside: 5.0,
            actual_std_dev: 0.0,
            avg_deviation: 0.0,
            max_deviation: 0.0,
            setpoint_changed: false,
            trend_positive: false,
            responsiveness: Responsiveness::NotEvaluated,
        }
    }

    #[test]
    fn test_baseline_has_no_tips_and_is_ok() {
        // ---
        let s = baseline();
        assert!(collect_tips(&s).is_empty());
        assert_eq!(classify(&s), (Status::Ok, MSG_STABLE));
    }

    #[test]
    fn test_open_window_preempts_ventilation_and_cold_rows() {
        // ---
        let s = Signals {
            latest_actual: 19.5,
            latest_set: 18.0,
            outside_now: 10.0,
            temp_diff_outside: 9.5,
            ..baseline()
        };
        // Row 4 (actual < 20, outside < 15) also holds, row 1 wins.
        assert_eq!(collect_tips(&s), vec![Tip::OpenWindow]);
    }

    #[test]
    fn test_close_blinds() {
        // ---
        let s = Signals {
            latest_actual: 20.0,
            latest_set: 22.0,
            outside_now: 25.0,
            temp_diff_outside: -5.0,
            ..baseline()
        };
        assert_eq!(collect_tips(&s), vec![Tip::CloseBlinds]);
    }

    #[test]
    fn test_ventilation_and_keep_closed() {
        // ---
        let similar = Signals {
            outside_now: 21.2,
            temp_diff_outside: -0.2,
            ..baseline()
        };
        assert_eq!(collect_tips(&similar), vec![Tip::NaturalVentilation]);

        let cold = Signals {
            latest_actual: 19.5,
            latest_set: 20.0,
            outside_now: 5.0,
            temp_diff_outside: 14.5,
            ..baseline()
        };
        assert_eq!(collect_tips(&cold), vec![Tip::KeepWindowsClosed]);
    }

    #[test]
    fn test_independent_tips_stack_on_climate_tip() {
        // ---
        let s = Signals {
            latest_actual: 27.0,
            latest_set: 25.0,
            outside_now: 12.0,
            temp_diff_outside: 15.0,
            actual_std_dev: 2.0,
            ..baseline()
        };
        assert_eq!(
            collect_tips(&s),
            vec![
                Tip::OpenWindow,
                Tip::TargetOutsideComfortRange,
                Tip::StrongFluctuations
            ]
        );
    }

    #[test]
    fn test_comfort_range_bounds_are_exclusive() {
        // ---
        for set in [18.0, 24.0] {
            let s = Signals {
                latest_set: set,
                latest_actual: set,
                ..baseline()
            };
            assert!(!collect_tips(&s).contains(&Tip::TargetOutsideComfortRange));
        }
        let low = Signals {
            latest_set: 17.5,
            latest_actual: 17.5,
            outside_now: 12.0,
            temp_diff_outside: 5.5,
            ..baseline()
        };
        assert!(collect_tips(&low).contains(&Tip::TargetOutsideComfortRange));
    }

    #[test]
    fn test_status_priority_order() {
        // ---
        // Row 1 beats row 2 when both hold.
        let s = Signals {
            max_deviation: 2.5,
            avg_deviation: 2.5,
            ..baseline()
        };
        assert_eq!(classify(&s), (Status::Warning, MSG_STRONG_DEVIATION));

        // A set-point change disables row 1, row 2 takes over.
        let s = Signals {
            setpoint_changed: true,
            responsiveness: Responsiveness::DidNotRespond,
            ..s
        };
        assert_eq!(classify(&s), (Status::Warning, MSG_NOT_APPROACHING));

        // With a positive trend row 3 is next.
        let s = Signals {
            trend_positive: true,
            ..s
        };
        assert_eq!(classify(&s), (Status::Warning, MSG_NOT_RESPONDING));

        let s = Signals {
            responsiveness: Responsiveness::Responded,
            ..s
        };
        assert_eq!(classify(&s), (Status::Info, MSG_APPROACHING));

        let s = Signals {
            trend_positive: false,
            max_deviation: 1.0,
            avg_deviation: 1.0,
            ..s
        };
        assert_eq!(classify(&s), (Status::Info, MSG_INCONCLUSIVE));
    }

    #[test]
    fn test_not_evaluated_never_triggers_response_warning() {
        // ---
        let s = Signals {
            trend_positive: true,
            max_deviation: 1.5,
            avg_deviation: 1.2,
            responsiveness: Responsiveness::NotEvaluated,
            ..baseline()
        };
        assert_eq!(classify(&s), (Status::Info, MSG_APPROACHING));
    }

    #[test]
    fn test_tips_and_status_serialize_as_text() {
        // ---
        let json = serde_json::to_value((Status::Warning, Tip::CloseBlinds)).unwrap();
        assert_eq!(json[0], "warning");
        assert_eq!(json[1], Tip::CloseBlinds.message());
    }
}
