use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PageError;
use crate::profile::Profile;

use super::field::{FieldDescriptor, FieldKind};
use super::matcher::{FieldMatcher, OptionResolver, SecondOptionResolver};
use super::page::{Control, FormPage};
use super::state::{Advance, Ending, Transition, WizardState};

/// Settle delays applied after each kind of interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardTimings {
    pub after_click: Duration,
    pub after_upload: Duration,
    pub after_check: Duration,
    pub between_steps: Duration,
}

impl Default for WizardTimings {
    fn default() -> Self {
        Self {
            after_click: Duration::from_millis(2000),
            after_upload: Duration::from_millis(2000),
            after_check: Duration::from_millis(500),
            between_steps: Duration::from_millis(1500),
        }
    }
}

#[cfg(test)]
impl WizardTimings {
    pub fn instant() -> Self {
        Self {
            after_click: Duration::ZERO,
            after_upload: Duration::ZERO,
            after_check: Duration::ZERO,
            between_steps: Duration::ZERO,
        }
    }
}

/// What a single `fill_step` changed on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub selected: usize,
    pub attached: bool,
    pub checked: usize,
    /// Fields dropped because of an element-level error.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardOutcome {
    /// A submit control was clicked. Not a confirmation that the board accepted it.
    pub submitted: bool,
    pub steps_used: u32,
    pub ending: Ending,
}

impl WizardOutcome {
    fn new(ending: Ending, steps_used: u32) -> Self {
        Self {
            submitted: ending == Ending::Submitted,
            steps_used,
            ending,
        }
    }
}

/// Drives an application form through its steps.
pub struct FormWalker {
    matcher: FieldMatcher,
    resolver: Box<dyn OptionResolver + Send + Sync>,
    timings: WizardTimings,
}

impl Default for FormWalker {
    fn default() -> Self {
        Self::new(FieldMatcher::default(), WizardTimings::default())
    }
}

impl FormWalker {
    pub fn new(matcher: FieldMatcher, timings: WizardTimings) -> Self {
        Self {
            matcher,
            resolver: Box::new(SecondOptionResolver),
            timings,
        }
    }

    pub fn with_resolver(mut self, resolver: impl OptionResolver + Send + Sync + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Fills every field of the current step that the profile has a value for.
    ///
    /// Text-like fields get overwritten, dropdowns get the resolver's choice,
    /// the resume is attached to the first file input, and required unchecked
    /// checkboxes are ticked. Fields that match nothing stay untouched.
    pub async fn fill_step<P: FormPage>(
        &self,
        page: &mut P,
        profile: &Profile,
    ) -> Result<FillReport, PageError> {
        let mut report = FillReport::default();

        for kind in FieldKind::TEXT_LIKE {
            for field in page.fields(kind).await? {
                let result = self.fill_text(page, kind, &field, profile).await;
                if let Some(true) = tolerate(result, &mut report, kind)? {
                    report.filled += 1;
                }
            }
        }

        for field in page.fields(FieldKind::Select).await? {
            let result = self.choose_option(page, &field).await;
            if let Some(true) = tolerate(result, &mut report, FieldKind::Select)? {
                report.selected += 1;
            }
        }

        match profile.attachable_resume() {
            Some(path) => {
                let inputs = page.fields(FieldKind::File).await?;
                if let Some(input) = inputs.first() {
                    let result = page.attach_file(input, path).await;
                    if tolerate(result, &mut report, FieldKind::File)?.is_some() {
                        page.settle(self.timings.after_upload).await;
                        report.attached = true;
                    }
                }
            }
            None => debug!("no resume on disk, skipping file inputs"),
        }

        for checkbox in page.fields(FieldKind::Checkbox).await? {
            let result = self.tick_required(page, &checkbox).await;
            if let Some(true) = tolerate(result, &mut report, FieldKind::Checkbox)? {
                report.checked += 1;
            }
        }

        Ok(report)
    }

    /// Clicks the first navigation control found, probing next, continue, then submit.
    pub async fn advance<P: FormPage>(&self, page: &mut P) -> Result<Advance, PageError> {
        for control in Control::PRIORITY {
            let Some(handle) = page.find_control(control).await? else {
                continue;
            };
            page.click(&handle).await?;
            page.settle(self.timings.after_click).await;
            debug!(%control, "clicked wizard control");
            return Ok(if control == Control::Submit {
                Advance::SUBMITTED
            } else {
                Advance::MOVED
            });
        }
        Ok(Advance::STUCK)
    }

    /// Alternates `fill_step` and `advance` until submitted, stuck, or `max_steps` is used up.
    pub async fn run_wizard<P: FormPage>(
        &self,
        page: &mut P,
        profile: &Profile,
        max_steps: u32,
    ) -> Result<WizardOutcome, PageError> {
        let mut state = WizardState::new(max_steps);

        while state.can_step() {
            let step = state.steps_taken + 1;
            let report = self.fill_step(page, profile).await?;
            debug!(
                step,
                filled = report.filled,
                selected = report.selected,
                checked = report.checked,
                attached = report.attached,
                "filled wizard step"
            );

            let advance = self.advance(page).await?;
            match state.record(advance) {
                Transition::Continue => page.settle(self.timings.between_steps).await,
                Transition::Done(ending) => {
                    return Ok(WizardOutcome::new(ending, state.steps_taken));
                }
            }
        }

        Ok(WizardOutcome::new(Ending::Exhausted, state.steps_taken))
    }

    async fn fill_text<P: FormPage>(
        &self,
        page: &mut P,
        kind: FieldKind,
        field: &P::Handle,
        profile: &Profile,
    ) -> Result<bool, PageError> {
        let identity = page.identity(field).await?;
        let descriptor = FieldDescriptor::new(kind, &identity);
        let Some(slot) = self.matcher.classify(&descriptor) else {
            return Ok(false);
        };
        let value = slot.value(profile);
        if value.is_empty() {
            return Ok(false);
        }
        page.overwrite_text(field, value).await?;
        debug!(kind = %descriptor.kind, field = %descriptor.identifier, ?slot, "filled");
        Ok(true)
    }

    async fn choose_option<P: FormPage>(
        &self,
        page: &mut P,
        field: &P::Handle,
    ) -> Result<bool, PageError> {
        let options = page.options(field).await?;
        if options.len() < 2 {
            return Ok(false);
        }
        let identity = page.identity(field).await?;
        let descriptor = FieldDescriptor::new(FieldKind::Select, &identity);
        match self.resolver.resolve(&descriptor, &options) {
            Some(index) if index < options.len() => {
                page.select_option(field, index).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn tick_required<P: FormPage>(
        &self,
        page: &mut P,
        checkbox: &P::Handle,
    ) -> Result<bool, PageError> {
        if !page.is_required(checkbox).await? || page.is_checked(checkbox).await? {
            return Ok(false);
        }
        page.click(checkbox).await?;
        page.settle(self.timings.after_check).await;
        Ok(true)
    }
}

// Element-level failures skip the field; anything else aborts the step.
fn tolerate<T>(
    result: Result<T, PageError>,
    report: &mut FillReport,
    kind: FieldKind,
) -> Result<Option<T>, PageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable() => {
            warn!(%kind, error = %err, "skipping field");
            report.skipped += 1;
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
