//! Shot orchestration: the per-shot state machine and batch fan-out.
//!
//! A [`Studio`] owns the whole [`BatchState`] inside a `watch` channel.
//! Mutations are short synchronous edits; nothing holds the state across an
//! await, so the five in-flight generations only ever touch their own slot.

use futures_util::future::join_all;
use shotgen_types::shots::{ShotKind, ShotStatus};
use thiserror::Error;
use tokio::sync::watch;

use crate::generator::{GenerateShot, GeneratedImage, ImageGenerator};
use crate::reference::ReferenceImage;

/// 单张镜头的状态槽。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shot {
    pub kind: ShotKind,
    pub label: &'static str,
    pub description: &'static str,
    pub status: ShotStatus,
    /// 仅在 `Completed` 时存在。
    pub result_image: Option<GeneratedImage>,
    /// 仅在 `Error` 时存在。
    pub last_error: Option<String>,
    /// 已发起的生成次数；只有最新一次的结果会被写回。
    pub attempt: u64,
}

impl Shot {
    fn idle(kind: ShotKind) -> Self {
        Self {
            kind,
            label: kind.label(),
            description: kind.description(),
            status: ShotStatus::Idle,
            result_image: None,
            last_error: None,
            attempt: 0,
        }
    }

    fn begin(&mut self) -> u64 {
        self.attempt += 1;
        self.status = ShotStatus::Generating;
        self.result_image = None;
        self.last_error = None;
        self.attempt
    }

    fn settle(&mut self, attempt: u64, result: crate::Result<GeneratedImage>) -> bool {
        if self.attempt != attempt || self.status != ShotStatus::Generating {
            return false;
        }
        match result {
            Ok(image) => {
                self.status = ShotStatus::Completed;
                self.result_image = Some(image);
            }
            Err(err) => {
                self.status = ShotStatus::Error;
                self.last_error = Some(err.to_string());
            }
        }
        true
    }

    /// 调用被丢弃时，把仍停在该次生成上的镜头放回 `Idle`。
    fn abandon(&mut self, attempt: u64) -> bool {
        if self.attempt != attempt || self.status != ShotStatus::Generating {
            return false;
        }
        self.status = ShotStatus::Idle;
        true
    }
}

/// 页面级状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchState {
    pub product_name: String,
    pub reference_image: Option<ReferenceImage>,
    /// 按 [`ShotKind::ALL`] 排列。
    pub shots: [Shot; 5],
    pub is_batch_running: bool,
}

impl Default for BatchState {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            reference_image: None,
            shots: ShotKind::ALL.map(Shot::idle),
            is_batch_running: false,
        }
    }
}

impl BatchState {
    #[must_use]
    pub fn shot(&self, kind: ShotKind) -> &Shot {
        &self.shots[kind.index()]
    }

    /// 是否至少提供了产品名或参考图。
    #[must_use]
    pub fn has_product_descriptor(&self) -> bool {
        !self.product_name.trim().is_empty() || self.reference_image.is_some()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_batch_running && self.has_product_descriptor()
    }

    fn request_for(&self, kind: ShotKind) -> GenerateShot {
        GenerateShot::new(kind, self.product_name.clone(), self.reference_image.clone())
    }
}

/// 单次生成的结局。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotOutcome {
    Completed,
    Failed(String),
    /// 结果到达前该镜头已被重新发起，结果被丢弃。
    Superseded,
}

/// 一次批量生成的汇总。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<(ShotKind, ShotOutcome)>,
}

impl BatchReport {
    #[must_use]
    pub fn outcome(&self, kind: ShotKind) -> Option<&ShotOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, outcome)| outcome)
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|outcome| matches!(outcome, ShotOutcome::Completed))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, ShotOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&ShotOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a batch is already running")]
    AlreadyRunning,
    #[error("a product name or a reference image is required")]
    MissingProductDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("{0} shot is still generating")]
    ShotInFlight(ShotKind),
}

struct Ticket {
    request: GenerateShot,
    attempt: u64,
}

/// 批量运行标记的守卫。
///
/// 批量 future 被提前丢弃时同样会清除标记，并把本批仍在生成中的镜头放回 `Idle`。
struct BatchRunning<'a> {
    state: &'a watch::Sender<BatchState>,
    attempts: [u64; 5],
}

impl Drop for BatchRunning<'_> {
    fn drop(&mut self) {
        let attempts = self.attempts;
        self.state.send_modify(|state| {
            state.is_batch_running = false;
            for (shot, attempt) in state.shots.iter_mut().zip(attempts) {
                shot.abandon(attempt);
            }
        });
    }
}

/// 单张重试的守卫：future 被提前丢弃时把该镜头放回 `Idle`，以便再次重试。
struct RetryPending<'a> {
    state: &'a watch::Sender<BatchState>,
    kind: ShotKind,
    attempt: u64,
}

impl Drop for RetryPending<'_> {
    fn drop(&mut self) {
        let (kind, attempt) = (self.kind, self.attempt);
        self.state
            .send_if_modified(|state| state.shots[kind.index()].abandon(attempt));
    }
}

/// 镜头编排器：持有状态并驱动生成器。
pub struct Studio<G> {
    generator: G,
    state: watch::Sender<BatchState>,
}

impl<G: ImageGenerator> Studio<G> {
    pub fn new(generator: G) -> Self {
        let (state, _) = watch::channel(BatchState::default());
        Self { generator, state }
    }

    /// 当前状态的拷贝。
    #[must_use]
    pub fn snapshot(&self) -> BatchState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn shot(&self, kind: ShotKind) -> Shot {
        self.state.borrow().shot(kind).clone()
    }

    #[must_use]
    pub fn is_batch_running(&self) -> bool {
        self.state.borrow().is_batch_running
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.state.borrow().can_submit()
    }

    /// 订阅状态变化（每次状态迁移都会通知）。
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BatchState> {
        self.state.subscribe()
    }

    pub fn set_product_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.state.send_modify(|state| state.product_name = name);
    }

    pub fn set_reference_image(&self, image: ReferenceImage) {
        self.state
            .send_modify(|state| state.reference_image = Some(image));
    }

    pub fn clear_reference_image(&self) {
        self.state.send_if_modified(|state| state.reference_image.take().is_some());
    }

    /// 重新生成全部五张镜头，等待所有请求落定后返回。
    ///
    /// 单张失败不会影响其他镜头。
    ///
    /// # Errors
    /// 已有批量在运行，或既无产品名也无参考图时拒绝，且不发起任何请求。
    pub async fn submit_batch(&self) -> Result<BatchReport, SubmitError> {
        let mut admitted = Err(SubmitError::AlreadyRunning);
        self.state.send_if_modified(|state| {
            if state.is_batch_running {
                return false;
            }
            if !state.has_product_descriptor() {
                admitted = Err(SubmitError::MissingProductDescriptor);
                return false;
            }
            state.is_batch_running = true;
            let tickets = ShotKind::ALL.map(|kind| Ticket {
                request: state.request_for(kind),
                attempt: state.shots[kind.index()].begin(),
            });
            admitted = Ok(tickets);
            true
        });
        let tickets = admitted.inspect_err(|err| {
            tracing::warn!(error = %err, "batch submission rejected");
        })?;
        let running = BatchRunning {
            state: &self.state,
            attempts: tickets.each_ref().map(|ticket| ticket.attempt),
        };

        tracing::info!(
            product = %tickets[0].request.product_name,
            reference = tickets[0].request.reference.is_some(),
            "batch started"
        );
        let outcomes = join_all(tickets.iter().map(|ticket| self.run(ticket))).await;
        drop(running);

        let report = BatchReport {
            outcomes: ShotKind::ALL.into_iter().zip(outcomes).collect(),
        };
        tracing::info!(
            completed = report.completed(),
            failed = report.failed(),
            "batch settled"
        );
        Ok(report)
    }

    /// 用当前输入重新生成单张镜头；不影响批量运行标记。
    ///
    /// # Errors
    /// 该镜头仍在生成中时拒绝。
    pub async fn retry(&self, kind: ShotKind) -> Result<ShotOutcome, RetryError> {
        let mut admitted = Err(RetryError::ShotInFlight(kind));
        self.state.send_if_modified(|state| {
            if state.shot(kind).status == ShotStatus::Generating {
                return false;
            }
            let request = state.request_for(kind);
            let attempt = state.shots[kind.index()].begin();
            admitted = Ok(Ticket { request, attempt });
            true
        });
        let ticket = admitted?;
        let pending = RetryPending {
            state: &self.state,
            kind,
            attempt: ticket.attempt,
        };
        tracing::info!(kind = %kind, "retrying shot");
        let outcome = self.run(&ticket).await;
        drop(pending);
        Ok(outcome)
    }

    async fn run(&self, ticket: &Ticket) -> ShotOutcome {
        let kind = ticket.request.kind;
        let result = self.generator.generate(&ticket.request).await;
        let outcome = match &result {
            Ok(_) => ShotOutcome::Completed,
            Err(err) => ShotOutcome::Failed(err.to_string()),
        };

        let applied = self
            .state
            .send_if_modified(|state| state.shots[kind.index()].settle(ticket.attempt, result));
        if !applied {
            tracing::debug!(kind = %kind, attempt = ticket.attempt, "stale result dropped");
            return ShotOutcome::Superseded;
        }
        if let ShotOutcome::Failed(message) = &outcome {
            tracing::warn!(kind = %kind, error = %message, "shot generation failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn image() -> GeneratedImage {
        GeneratedImage::new(vec![1, 2, 3], "image/png")
    }

    #[test]
    fn initial_state_is_five_idle_shots() {
        let state = BatchState::default();
        assert_eq!(state.shots.len(), 5);
        for (shot, kind) in state.shots.iter().zip(ShotKind::ALL) {
            assert_eq!(shot.kind, kind);
            assert_eq!(shot.status, ShotStatus::Idle);
            assert_eq!(shot.label, kind.label());
        }
        assert!(!state.can_submit());
    }

    #[test]
    fn blank_name_is_not_a_descriptor() {
        let mut state = BatchState {
            product_name: "   ".into(),
            ..BatchState::default()
        };
        assert!(!state.has_product_descriptor());
        state.reference_image = Some(ReferenceImage::from_bytes(vec![0], "image/png"));
        assert!(state.has_product_descriptor());
    }

    #[test]
    fn begin_clears_previous_result() {
        let mut shot = Shot::idle(ShotKind::Main);
        let attempt = shot.begin();
        assert!(shot.settle(attempt, Ok(image())));
        assert_eq!(shot.status, ShotStatus::Completed);

        let attempt = shot.begin();
        assert_eq!(shot.status, ShotStatus::Generating);
        assert!(shot.result_image.is_none());
        assert!(shot.settle(
            attempt,
            Err(Error::Parse {
                message: "boom".into()
            })
        ));
        assert_eq!(shot.status, ShotStatus::Error);
        assert_eq!(shot.last_error.as_deref(), Some("Parse error: boom"));
        assert!(shot.result_image.is_none());
    }

    #[test]
    fn stale_attempt_is_ignored() {
        let mut shot = Shot::idle(ShotKind::Detail);
        let first = shot.begin();
        let second = shot.begin();
        assert!(!shot.settle(first, Ok(image())));
        assert_eq!(shot.status, ShotStatus::Generating);
        assert!(shot.settle(second, Ok(image())));
        assert_eq!(shot.status, ShotStatus::Completed);
    }

    #[test]
    fn dropped_batch_guard_resets_its_own_shots() {
        let (sender, _) = watch::channel(BatchState::default());
        let mut attempts = [0; 5];
        sender.send_modify(|state| {
            state.is_batch_running = true;
            for (shot, slot) in state.shots.iter_mut().zip(attempts.iter_mut()) {
                *slot = shot.begin();
            }
            // Main was re-issued after the batch started.
            state.shots[0].begin();
        });

        drop(BatchRunning {
            state: &sender,
            attempts,
        });

        let state = sender.borrow();
        assert!(!state.is_batch_running);
        assert_eq!(state.shot(ShotKind::Main).status, ShotStatus::Generating);
        for kind in &ShotKind::ALL[1..] {
            assert_eq!(state.shot(*kind).status, ShotStatus::Idle);
        }
    }

    #[test]
    fn dropped_retry_guard_releases_the_shot() {
        let (sender, _) = watch::channel(BatchState::default());
        let mut attempt = 0;
        sender.send_modify(|state| attempt = state.shots[ShotKind::Detail.index()].begin());

        drop(RetryPending {
            state: &sender,
            kind: ShotKind::Detail,
            attempt,
        });
        assert_eq!(sender.borrow().shot(ShotKind::Detail).status, ShotStatus::Idle);

        // A settled shot is left alone.
        let mut attempt = 0;
        sender.send_modify(|state| {
            let shot = &mut state.shots[ShotKind::Detail.index()];
            attempt = shot.begin();
            shot.settle(attempt, Ok(image()));
        });
        drop(RetryPending {
            state: &sender,
            kind: ShotKind::Detail,
            attempt,
        });
        assert_eq!(
            sender.borrow().shot(ShotKind::Detail).status,
            ShotStatus::Completed
        );
    }

    #[test]
    fn report_counts_outcomes() {
        let report = BatchReport {
            outcomes: vec![
                (ShotKind::Main, ShotOutcome::Completed),
                (ShotKind::Angle, ShotOutcome::Failed("x".into())),
                (ShotKind::Detail, ShotOutcome::Superseded),
            ],
        };
        assert_eq!(report.completed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.outcome(ShotKind::Angle),
            Some(&ShotOutcome::Failed("x".into()))
        );
        assert_eq!(report.outcome(ShotKind::Lifestyle), None);
    }
}
