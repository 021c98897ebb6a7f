use crate::config::SessionConfig;
use crate::design::Design;
use crate::logger::TrialLogger;
use anyhow::Result;
use log::{info, warn};
use std::time::Duration;
use ultex_core::{Decision, ExpressionPhase, LogRecord, Stage};
use ultex_timing::Clock;

/// Sink for the per-run video sessions the state machine drives.
///
/// `begin_run` opens one recording session (the `prefix` distinguishes
/// the baseline file), `capture_frame` grabs a single frame into it (a
/// miss is tolerated and must not throw), `end_run` closes it. The
/// session guarantees begin/end calls are balanced and never nested.
pub trait Recorder {
    fn begin_run(&mut self, run: u32, prefix: &str) -> Result<()>;
    fn capture_frame(&mut self) -> bool;
    fn end_run(&mut self);
}

/// What the participant should currently see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Welcome,
    /// Numbered instruction screen, 1-based.
    Instruction(u32),
    BaselineNotice,
    Fixation,
    Neutral,
    /// Emotion image keyed by the trial's emotion id.
    Emotion(u32),
    DecisionPrompt,
    RunBreak,
    Finished,
}

/// Keyboard input, already translated by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Space or Enter.
    Ack,
    /// Left or Right arrow during the decision window.
    Choose(Decision),
}

/// The trial-stage state machine.
///
/// Driven by [`Session::tick`] once per scheduler pass (one redraw in the
/// app, one call in tests); all timing decisions compare the clock's
/// monotonic now against the stage entry timestamp. Stage order within a
/// trial is Offer → Emotion → Decision, the trial index grows by exactly
/// one per resolved decision, and runs break after trials 25, 50 and 75.
pub struct Session<C: Clock, R: Recorder> {
    config: SessionConfig,
    design: Design,
    clock: C,
    recorder: R,
    logger: Option<TrialLogger>,

    stage: Stage,
    screen: Screen,
    offer_label: Option<String>,
    run: u32,
    trial: u32,
    ack_count: u32,
    baseline_count: u32,
    expression: ExpressionPhase,
    decision: Decision,
    stage_entered: u64,
    onset_at: u64,
}

impl<C: Clock, R: Recorder> Session<C, R> {
    pub fn new(config: SessionConfig, design: Design, clock: C, recorder: R) -> Result<Self> {
        design.require_trials(config.total_trials)?;
        Ok(Self {
            config,
            design,
            clock,
            recorder,
            logger: None,
            stage: Stage::Instructions,
            screen: Screen::Welcome,
            offer_label: None,
            run: 1,
            trial: 1,
            ack_count: 0,
            baseline_count: 0,
            expression: ExpressionPhase::Inactive,
            decision: Decision::None,
            stage_entered: 0,
            onset_at: 0,
        })
    }

    /// One scheduler pass. Instructions, run breaks and the terminal
    /// screen only move on key input; everything else polls the clock.
    pub fn tick(&mut self) -> Result<()> {
        match self.stage {
            Stage::Instructions | Stage::RunBreak | Stage::Done => Ok(()),
            Stage::Baseline => self.tick_baseline(),
            Stage::Offer => self.tick_offer(),
            Stage::Emotion => self.tick_emotion(),
            Stage::Decision => self.tick_decision(),
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Result<()> {
        match (self.stage, event) {
            (Stage::Instructions, SessionEvent::Ack) => {
                self.ack_count += 1;
                if self.ack_count >= self.config.ack_presses {
                    self.start_baseline()
                } else {
                    self.screen = Screen::Instruction(self.ack_count);
                    Ok(())
                }
            }
            (Stage::RunBreak, SessionEvent::Ack) => self.start_baseline(),
            (Stage::Decision, SessionEvent::Choose(choice)) => self.resolve_decision(choice),
            _ => Ok(()),
        }
    }

    fn start_baseline(&mut self) -> Result<()> {
        self.stage = Stage::Baseline;
        self.screen = Screen::BaselineNotice;
        self.baseline_count = 0;
        self.stage_entered = self.clock.now();
        info!("run {}: baseline capture", self.run);
        self.recorder.begin_run(self.run, "b")
    }

    fn tick_baseline(&mut self) -> Result<()> {
        self.recorder.capture_frame();
        self.baseline_count += 1;
        if self.baseline_count >= self.config.baseline_frames {
            self.recorder.end_run();
            self.open_run()?;
            self.enter_offer();
        }
        Ok(())
    }

    /// Opens the trial log and the run video session. Errors here are
    /// structural (bad data dir, dead camera) and abort the session.
    fn open_run(&mut self) -> Result<()> {
        self.logger = Some(TrialLogger::create(
            &self.config.data_dir,
            self.config.subject_id,
            self.run,
        )?);
        self.recorder.begin_run(self.run, "")?;
        info!("run {} started at trial {}", self.run, self.trial);
        Ok(())
    }

    fn enter_offer(&mut self) {
        self.stage = Stage::Offer;
        self.screen = Screen::Fixation;
        self.offer_label = None;
        self.expression = ExpressionPhase::Inactive;
        self.decision = Decision::None;
        self.stage_entered = self.clock.now();
        self.log_transition();
    }

    fn tick_offer(&mut self) -> Result<()> {
        self.recorder.capture_frame();
        if self.clock.elapsed(self.stage_entered) >= self.config.offer_hold {
            self.enter_emotion();
        }
        Ok(())
    }

    fn enter_emotion(&mut self) {
        let row = *self.design.row(self.trial);
        self.stage = Stage::Emotion;
        self.screen = Screen::Neutral;
        self.expression = ExpressionPhase::Pre;
        self.offer_label = Some(format!("Offer: ${:.0}", row.offer));
        self.stage_entered = self.clock.now();
        self.onset_at = 0;
        self.log_transition();
    }

    fn tick_emotion(&mut self) -> Result<()> {
        self.recorder.capture_frame();
        let row = *self.design.row(self.trial);
        let elapsed = self.clock.elapsed(self.stage_entered);

        // The hard 6 s exit comes first so a malformed onset/duration can
        // never hold the stage open.
        if elapsed >= self.config.emotion_window {
            self.enter_decision();
        } else if self.expression == ExpressionPhase::Pre
            && elapsed >= Duration::from_secs_f64(row.onset_delay.max(0.0))
        {
            self.expression = ExpressionPhase::Onset;
            self.screen = Screen::Emotion(row.emotion_id);
            self.onset_at = self.clock.now();
            self.log_transition();
        } else if self.expression == ExpressionPhase::Onset
            && self.clock.elapsed(self.onset_at)
                >= Duration::from_secs_f64(row.emotion_duration.max(0.0))
        {
            self.expression = ExpressionPhase::Offset;
            self.screen = Screen::Neutral;
            self.log_transition();
        }
        Ok(())
    }

    fn enter_decision(&mut self) {
        self.stage = Stage::Decision;
        self.screen = Screen::DecisionPrompt;
        self.offer_label = None;
        self.expression = ExpressionPhase::Inactive;
        self.stage_entered = self.clock.now();
        self.log_transition();
    }

    fn tick_decision(&mut self) -> Result<()> {
        self.recorder.capture_frame();
        if self.clock.elapsed(self.stage_entered) >= self.config.decision_window {
            self.resolve_decision(Decision::None)?;
        }
        Ok(())
    }

    /// Records the decision (or the timeout) and moves to the next trial.
    fn resolve_decision(&mut self, choice: Decision) -> Result<()> {
        self.decision = choice;
        self.log_transition();
        self.advance_trial()
    }

    fn advance_trial(&mut self) -> Result<()> {
        self.trial += 1;
        if self.trial > self.config.total_trials {
            self.close_run();
            self.stage = Stage::Done;
            self.screen = Screen::Finished;
            self.offer_label = None;
            info!("session complete after trial {}", self.trial - 1);
        } else if self.is_run_boundary(self.trial) {
            self.close_run();
            self.run += 1;
            self.stage = Stage::RunBreak;
            self.screen = Screen::RunBreak;
            self.offer_label = None;
            info!("run break before trial {}", self.trial);
        } else {
            self.enter_offer();
        }
        Ok(())
    }

    fn is_run_boundary(&self, trial: u32) -> bool {
        trial > 1 && (trial - 1) % self.config.trials_per_run == 0
    }

    fn close_run(&mut self) {
        if let Some(logger) = &mut self.logger {
            if let Err(e) = logger.close() {
                warn!("failed to close trial log: {e}");
            }
        }
        self.logger = None;
        self.recorder.end_run();
    }

    fn log_transition(&mut self) {
        let Some(logger) = &mut self.logger else {
            return;
        };
        let record = LogRecord {
            sid: self.config.subject_id,
            run: self.run,
            trial: self.trial,
            stage: self.stage,
            expression: self.expression,
            decision: self.decision,
            time: self.clock.unix_time(),
            design: *self.design.row(self.trial),
        };
        if let Err(e) = logger.write(&record) {
            warn!("trial log write failed: {e}");
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn offer_label(&self) -> Option<&str> {
        self.offer_label.as_deref()
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    pub fn trial(&self) -> u32 {
        self.trial
    }

    pub fn expression(&self) -> ExpressionPhase {
        self.expression
    }

    pub fn is_done(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }
}
