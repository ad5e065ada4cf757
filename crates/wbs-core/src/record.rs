//! Task records
//!
//! One [`TaskRecord`] per source row:
//! - [`DepthCode`] nesting marker run with optional direction glyph
//! - [`Schedule`] start, end and status, the only fields percolation touches
//! - [`Status`] percent complete with its [`StatusBucket`]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default nesting marker character
pub const DEFAULT_NESTING_MARKER: char = '*';

/// Raw depth marker of a row
///
/// `***` is level 2. A single trailing non-marker character is a direction
/// glyph used by diagram output only (`**<` places a node on the left).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthCode {
    marker: char,
    run: usize,
    direction: Option<char>,
}

/// Reasons a depth field is not a depth code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DepthCodeError {
    /// Field does not start with the nesting marker; row is non-structural
    #[error("depth field does not start with '{0}'")]
    NotStructural(char),

    /// More than one character follows the marker run
    #[error("unexpected text '{0}' after depth markers")]
    TrailingText(String),
}

impl DepthCode {
    /// Depth code for a nesting level
    #[inline]
    #[must_use]
    pub fn for_level(marker: char, level: usize) -> Self {
        Self {
            marker,
            run: level + 1,
            direction: None,
        }
    }

    /// Parse a trimmed depth field
    pub fn parse(raw: &str, marker: char) -> Result<Self, DepthCodeError> {
        let run = raw.chars().take_while(|&c| c == marker).count();
        if run == 0 {
            return Err(DepthCodeError::NotStructural(marker));
        }

        let rest: String = raw.chars().skip(run).collect();
        let mut tail = rest.chars();
        let direction = match (tail.next(), tail.next()) {
            (None, _) => None,
            (Some(glyph), None) => Some(glyph),
            (Some(_), Some(_)) => return Err(DepthCodeError::TrailingText(rest)),
        };

        Ok(Self {
            marker,
            run,
            direction,
        })
    }

    /// Nesting level encoded by the run length
    #[inline]
    #[must_use]
    pub fn level(&self) -> usize {
        self.run - 1
    }

    /// Rewrite the marker run to encode `level`
    #[inline]
    pub fn set_level(&mut self, level: usize) {
        self.run = level + 1;
    }

    /// Number of marker characters
    #[inline]
    #[must_use]
    pub fn run(&self) -> usize {
        self.run
    }

    /// Nesting marker character
    #[inline]
    #[must_use]
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Direction glyph, if any
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Option<char> {
        self.direction
    }

    /// Marker run without the direction glyph
    #[must_use]
    pub fn markers(&self) -> String {
        std::iter::repeat(self.marker).take(self.run).collect()
    }
}

impl fmt::Display for DepthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markers())?;
        if let Some(glyph) = self.direction {
            write!(f, "{glyph}")?;
        }
        Ok(())
    }
}

/// Percent complete
///
/// Negative is neutral, 0 is backlog (and "unset" for percolation),
/// 1..99 is running, 100 and above is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub i32);

impl Status {
    /// Not started
    pub const BACKLOG: Self = Self(0);
    /// Complete
    pub const DONE: Self = Self(100);
    /// Not applicable
    pub const NEUTRAL: Self = Self(-1);

    /// Raw percentage
    #[inline]
    #[must_use]
    pub fn value(self) -> i32 {
        self.0
    }

    /// Zero counts as not set when filling views
    #[inline]
    #[must_use]
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Genuinely incomplete: `[0, 100)`
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        (0..100).contains(&self.0)
    }

    /// Complete: `>= 100`
    #[inline]
    #[must_use]
    pub fn is_done(self) -> bool {
        self.0 >= 100
    }

    /// Status bucket
    #[must_use]
    pub fn bucket(self) -> StatusBucket {
        match self.0 {
            v if v < 0 => StatusBucket::Neutral,
            v if v < 1 => StatusBucket::Backlog,
            v if v < 50 => StatusBucket::RunningHalf1,
            v if v < 100 => StatusBucket::RunningHalf2,
            _ => StatusBucket::Done,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status classification used for labels and diagram styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusBucket {
    Neutral,
    Backlog,
    RunningHalf1,
    RunningHalf2,
    Done,
}

impl StatusBucket {
    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Backlog => "Backlog",
            Self::RunningHalf1 => "RunningHalf1",
            Self::RunningHalf2 => "RunningHalf2",
            Self::Done => "Done",
        }
    }

    /// Style class name in diagram headers
    #[must_use]
    pub fn style_class(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Backlog => "backlog",
            Self::RunningHalf1 => "runningHalf1",
            Self::RunningHalf2 => "runningHalf2",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheduling fields
///
/// Dates are `YYYY-MM-DD` strings compared lexically; empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: String,
    pub end: String,
    pub status: Status,
}

impl Schedule {
    /// Create schedule
    #[inline]
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>, status: Status) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            status,
        }
    }

    /// Start is set
    #[inline]
    #[must_use]
    pub fn has_start(&self) -> bool {
        !self.start.is_empty()
    }

    /// End is set
    #[inline]
    #[must_use]
    pub fn has_end(&self) -> bool {
        !self.end.is_empty()
    }
}

/// One row of a work breakdown source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub depth: DepthCode,
    pub description: String,
    pub owner: String,
    pub schedule: Schedule,
}

impl TaskRecord {
    /// Create record with empty schedule
    #[must_use]
    pub fn new(depth: DepthCode, id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            depth,
            description: description.into(),
            owner: String::new(),
            schedule: Schedule::default(),
        }
    }

    /// With start date
    #[inline]
    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.schedule.start = start.into();
        self
    }

    /// With end date
    #[inline]
    #[must_use]
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.schedule.end = end.into();
        self
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: i32) -> Self {
        self.schedule.status = Status(status);
        self
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> &str {
        &self.schedule.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> &str {
        &self.schedule.end
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        self.schedule.status
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:20} {:12} {:10} {:10} {:20} {:>3} {}",
            self.depth,
            self.description,
            self.id,
            self.schedule.start,
            self.schedule.end,
            self.owner,
            self.schedule.status,
            self.schedule.status.bucket(),
        )
    }
}
