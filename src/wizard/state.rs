use std::fmt;

/// Result of one `advance` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advance {
    pub advanced: bool,
    pub terminal: bool,
}

impl Advance {
    pub const STUCK: Advance = Advance {
        advanced: false,
        terminal: false,
    };
    pub const MOVED: Advance = Advance {
        advanced: true,
        terminal: false,
    };
    pub const SUBMITTED: Advance = Advance {
        advanced: true,
        terminal: true,
    };
}

/// How a wizard run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// A submit control was clicked. Says nothing about server-side acceptance.
    Submitted,
    /// No navigation control was found.
    Stuck,
    /// `max_steps` reached without submitting.
    Exhausted,
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ending::Submitted => write!(f, "SUBMITTED"),
            Ending::Stuck => write!(f, "STUCK"),
            Ending::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// The result of recording a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Run another fill/advance cycle.
    Continue,
    Done(Ending),
}

/// Per-attempt step counter with a safety bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub steps_taken: u32,
    pub max_steps: u32,
    pub terminal: bool,
}

impl WizardState {
    pub fn new(max_steps: u32) -> Self {
        Self {
            steps_taken: 0,
            max_steps,
            terminal: false,
        }
    }

    /// Whether another step may start. False once terminal or the bound is hit.
    pub fn can_step(&self) -> bool {
        !self.terminal && self.steps_taken < self.max_steps
    }

    /// Records the advance result of the step just taken.
    ///
    /// - a terminal advance ends the run as `Submitted`;
    /// - a step that found no control ends it as `Stuck`;
    /// - otherwise the run continues unless the bound is reached (`Exhausted`).
    pub fn record(&mut self, advance: Advance) -> Transition {
        self.steps_taken += 1;

        if advance.terminal {
            self.terminal = true;
            return Transition::Done(Ending::Submitted);
        }
        if !advance.advanced {
            return Transition::Done(Ending::Stuck);
        }
        if self.steps_taken >= self.max_steps {
            return Transition::Done(Ending::Exhausted);
        }
        Transition::Continue
    }
}
