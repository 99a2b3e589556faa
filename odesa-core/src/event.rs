//! Event model: raw sensor events, labels, winners and stage inputs.

use serde::{Deserialize, Serialize};

use crate::error::{InputError, InputResult};

// ═══════════════════════════════════════════════════════════════════════════════
// COMMON TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Event timestamp (monotonic, sensor units)
pub type Timestamp = f64;

/// Class index assigned by the output classifier
pub type ClassId = usize;

/// Index of the neuron that fired in a stage, `None` when no neuron fired.
pub type Winner = Option<usize>;

/// Converts a winner to the `-1` sentinel convention.
pub fn winner_to_raw(winner: Winner) -> i64 {
    winner.map_or(-1, |w| w as i64)
}

/// Converts a raw winner index; every negative value means "no winner".
pub fn winner_from_raw(raw: i64) -> Winner {
    usize::try_from(raw).ok()
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT
// ═══════════════════════════════════════════════════════════════════════════════

/// A single timestamped sensor sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Pixel/sensor column
    pub x: i64,
    /// Pixel/sensor row
    pub y: i64,
    /// Timestamp
    pub ts: Timestamp,
    /// Polarity (`±1`) or intensity
    pub polarity: f64,
}

impl Event {
    /// Number of fields in a raw event record
    pub const ARITY: usize = 4;

    pub fn new(x: i64, y: i64, ts: Timestamp, polarity: f64) -> Self {
        Self { x, y, ts, polarity }
    }

    /// Builds an event from a raw `[x, y, ts, p]` record.
    ///
    /// Rejects records of the wrong arity, fractional coordinates and
    /// non-finite timestamps or intensities.
    /// The polarity is kept as is, so intensity-valued sensors pass through.
    pub fn from_slice(record: &[f64]) -> InputResult<Self> {
        let [x, y, ts, p] = record else {
            return Err(InputError::InvalidEvent(format!(
                "expected {} fields (x, y, ts, p), got {}",
                Self::ARITY,
                record.len()
            )));
        };

        if !ts.is_finite() {
            return Err(InputError::InvalidEvent(format!("non-finite timestamp {ts}")));
        }
        if !p.is_finite() {
            return Err(InputError::InvalidEvent(format!("non-finite polarity {p}")));
        }

        Ok(Self {
            x: coordinate("x", *x)?,
            y: coordinate("y", *y)?,
            ts: *ts,
            polarity: *p,
        })
    }

    /// The event as an `(x, y, ts, p)` tuple.
    pub fn fields(&self) -> (i64, i64, Timestamp, f64) {
        (self.x, self.y, self.ts, self.polarity)
    }
}

impl TryFrom<&[f64]> for Event {
    type Error = InputError;

    fn try_from(record: &[f64]) -> InputResult<Self> {
        Self::from_slice(record)
    }
}

impl From<(i64, i64, Timestamp, f64)> for Event {
    fn from((x, y, ts, polarity): (i64, i64, Timestamp, f64)) -> Self {
        Self { x, y, ts, polarity }
    }
}

// i64::MAX is not representable as f64; 2^63 is the first value past it
const COORDINATE_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn coordinate(name: &str, value: f64) -> InputResult<i64> {
    if !value.is_finite()
        || value.fract() != 0.0
        || value < -COORDINATE_LIMIT
        || value >= COORDINATE_LIMIT
    {
        return Err(InputError::InvalidEvent(format!(
            "{name} must be an integer, got {value}"
        )));
    }
    Ok(value as i64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LABEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Ground-truth label attached to an event.
///
/// Only labelled events trigger reward/punish updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    /// Raw value `-1`
    #[default]
    Unlabelled,
    /// Raw value `>= 0`
    Class(ClassId),
}

impl Label {
    /// Parses the raw convention: `-1` is unlabelled, `>= 0` a class index.
    pub fn from_raw(raw: i64) -> InputResult<Self> {
        match raw {
            -1 => Ok(Label::Unlabelled),
            r if r >= 0 => usize::try_from(r)
                .map(Label::Class)
                .map_err(|_| InputError::InvalidLabel(raw)),
            _ => Err(InputError::InvalidLabel(raw)),
        }
    }

    pub fn to_raw(&self) -> i64 {
        match self {
            Label::Unlabelled => -1,
            Label::Class(c) => *c as i64,
        }
    }

    pub fn class(&self) -> Option<ClassId> {
        match self {
            Label::Unlabelled => None,
            Label::Class(c) => Some(*c),
        }
    }

    pub fn is_labelled(&self) -> bool {
        matches!(self, Label::Class(_))
    }
}

impl TryFrom<i64> for Label {
    type Error = InputError;

    fn try_from(raw: i64) -> InputResult<Self> {
        Self::from_raw(raw)
    }
}

impl From<ClassId> for Label {
    fn from(class: ClassId) -> Self {
        Label::Class(class)
    }
}

impl From<Option<ClassId>> for Label {
    fn from(class: Option<ClassId>) -> Self {
        class.map_or(Label::Unlabelled, Label::Class)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STAGE INPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Input consumed by a hidden layer or by the output classifier.
///
/// The first stage of a chain sees the raw event; every later stage (and the
/// classifier behind a non-empty chain) sees the winner emitted upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StageInput {
    /// Raw sensor event
    Raw(Event),
    /// Winner of the preceding stage, at the current event's timestamp
    Upstream { winner: Winner, ts: Timestamp },
}

impl StageInput {
    pub fn raw(event: Event) -> Self {
        StageInput::Raw(event)
    }

    pub fn upstream(winner: Winner, ts: Timestamp) -> Self {
        StageInput::Upstream { winner, ts }
    }

    pub fn ts(&self) -> Timestamp {
        match self {
            StageInput::Raw(event) => event.ts,
            StageInput::Upstream { ts, .. } => *ts,
        }
    }

    /// Uniform `(x, y, ts, p)` view.
    ///
    /// An upstream winner is encoded as `(0, winner, ts, 1.0)` with `-1` for no
    /// winner.
    pub fn legacy_fields(&self) -> (i64, i64, Timestamp, f64) {
        match self {
            StageInput::Raw(event) => event.fields(),
            StageInput::Upstream { winner, ts } => (0, winner_to_raw(*winner), *ts, 1.0),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PREDICTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Output of the classifier for one event.
///
/// `class` carries no meaning when `winner` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prediction {
    pub winner: Winner,
    pub class: Option<ClassId>,
}

impl Prediction {
    pub fn fired(winner: usize, class: ClassId) -> Self {
        Self {
            winner: Some(winner),
            class: Some(class),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn is_fired(&self) -> bool {
        self.winner.is_some()
    }
}
