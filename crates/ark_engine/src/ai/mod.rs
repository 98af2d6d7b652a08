use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::actor::Actor;
use crate::geometry::{Size, Vec2};

mod path;
mod task;

pub use path::{line_path, MAX_PATH_STEPS};
pub use task::{CompletionHook, Task, TaskCatalog, TaskDef, TaskKind};

pub const WAITING_COOLDOWN_MS: f32 = 2000.0;
pub const FOLLOW_STOP_DISTANCE_PX: f32 = 80.0;
/// NPC movement is not clamped to the room.
const UNBOUNDED: Size = Size::new(9999.0, 9999.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    Idle,
    MovingToLocation,
    PerformingTask,
    Waiting,
    Following,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatus {
    pub id: String,
    pub name: String,
    pub kind: TaskKind,
    pub description: String,
    pub progress: f32,
}

/// Snapshot handed to the state observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiStatus {
    pub actor: String,
    pub state: AiState,
    pub task: Option<TaskStatus>,
    pub completed: Vec<String>,
}

pub type StateObserver = Box<dyn FnMut(&AiStatus)>;

/// Task-driven state machine that owns and moves one NPC actor.
pub struct AiController {
    actor: Actor,
    catalog: TaskCatalog,
    state: AiState,
    task: Option<Task>,
    path: VecDeque<Vec2>,
    completed: Vec<String>,
    task_timer_ms: f32,
    waiting_elapsed_ms: f32,
    follow_target: Option<Vec2>,
    rng: StdRng,
    observer: Option<StateObserver>,
}

impl fmt::Debug for AiController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiController")
            .field("actor", &self.actor.name())
            .field("state", &self.state)
            .field("task", &self.task.as_ref().map(Task::id))
            .field("path_len", &self.path.len())
            .field("completed", &self.completed)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

impl AiController {
    pub fn new(actor: Actor, catalog: TaskCatalog) -> Self {
        Self::with_rng(actor, catalog, StdRng::from_entropy())
    }

    pub fn with_seed(actor: Actor, catalog: TaskCatalog, seed: u64) -> Self {
        Self::with_rng(actor, catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(actor: Actor, catalog: TaskCatalog, rng: StdRng) -> Self {
        Self {
            actor,
            catalog,
            state: AiState::Idle,
            task: None,
            path: VecDeque::new(),
            completed: Vec::new(),
            task_timer_ms: 0.0,
            waiting_elapsed_ms: 0.0,
            follow_target: None,
            rng,
            observer: None,
        }
    }

    pub fn set_state_observer(&mut self, observer: impl FnMut(&AiStatus) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_state_observer(&mut self) {
        self.observer = None;
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Ids in first-completion order.
    pub fn completed_tasks(&self) -> &[String] {
        &self.completed
    }

    pub fn path(&self) -> &VecDeque<Vec2> {
        &self.path
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn task_timer_ms(&self) -> f32 {
        self.task_timer_ms
    }

    pub fn is_following(&self) -> bool {
        self.state == AiState::Following
    }

    pub fn status(&self) -> AiStatus {
        AiStatus {
            actor: self.actor.name().to_string(),
            state: self.state,
            task: self.task.as_ref().map(|task| TaskStatus {
                id: task.def().id.clone(),
                name: task.def().name.clone(),
                kind: task.def().kind,
                description: task.def().description.clone(),
                progress: task.progress(),
            }),
            completed: self.completed.clone(),
        }
    }

    /// Assigns a fresh instance of a catalog task. Unknown ids change nothing.
    pub fn set_task(&mut self, id: &str) -> bool {
        let Some(def) = self.catalog.get(id).cloned() else {
            debug!(actor = %self.actor.name(), task = id, "npc_task_unknown");
            return false;
        };
        self.task = Some(Task::new(def));
        self.path.clear();
        self.follow_target = None;
        self.state = AiState::Idle;
        self.notify();
        true
    }

    /// Walks toward `target` until within [`FOLLOW_STOP_DISTANCE_PX`]. The current task is kept.
    pub fn start_following(&mut self, target: Vec2) {
        self.follow_target = Some(target);
        if self.state != AiState::Following {
            self.path.clear();
            self.state = AiState::Following;
            info!(actor = %self.actor.name(), "npc_following_started");
            self.notify();
        }
    }

    pub fn set_follow_target(&mut self, target: Vec2) {
        if self.state == AiState::Following {
            self.follow_target = Some(target);
        }
    }

    pub fn stop_following(&mut self) {
        if self.state != AiState::Following {
            return;
        }
        self.follow_target = None;
        self.state = AiState::Idle;
        info!(actor = %self.actor.name(), "npc_following_stopped");
        self.notify();
    }

    pub fn update(&mut self, dt_ms: f32) {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        if self.state == AiState::Idle {
            self.plan_next_step();
        }

        match self.state {
            AiState::Idle => self.idle_actor(dt_ms),
            AiState::MovingToLocation => self.step_along_path(dt_ms),
            AiState::PerformingTask => {
                self.idle_actor(dt_ms);
                self.perform_task(dt_ms);
            }
            AiState::Waiting => {
                self.idle_actor(dt_ms);
                self.waiting_elapsed_ms += dt_ms;
                if self.waiting_elapsed_ms >= WAITING_COOLDOWN_MS {
                    self.waiting_elapsed_ms = 0.0;
                    self.state = AiState::Idle;
                    self.notify();
                }
            }
            AiState::Following => self.step_toward_follow_target(dt_ms),
        }
    }

    fn plan_next_step(&mut self) {
        if self.task.is_none() {
            let Some(def) = self.choose_task() else {
                return;
            };
            debug!(actor = %self.actor.name(), task = %def.id, "npc_task_selected");
            self.task = Some(Task::new(def));
        }

        let target = self.task.as_ref().and_then(|task| task.def().target);
        match target {
            Some(target) => {
                self.path = line_path(self.actor.position(), target).into();
                self.state = AiState::MovingToLocation;
            }
            None => {
                self.task_timer_ms = 0.0;
                self.state = AiState::PerformingTask;
            }
        }
        self.notify();
    }

    fn choose_task(&mut self) -> Option<TaskDef> {
        let completed = &self.completed;
        let available: Vec<&TaskDef> = self
            .catalog
            .tasks()
            .iter()
            .filter(|task| !completed.contains(&task.id))
            .collect();
        if let Some(def) = available.choose(&mut self.rng) {
            return Some((*def).clone());
        }

        if !self.completed.is_empty() {
            debug!(
                actor = %self.actor.name(),
                completed = self.completed.len(),
                "npc_task_cycle_reset"
            );
            self.completed.clear();
        }
        self.catalog.tasks().choose(&mut self.rng).cloned()
    }

    fn step_along_path(&mut self, dt_ms: f32) {
        let position = self.actor.position();
        let speed = self.actor.speed();
        while let Some(next) = self.path.front().copied() {
            if position.distance(next) < speed {
                self.path.pop_front();
            } else {
                break;
            }
        }

        let direction = self
            .path
            .front()
            .and_then(|next| (*next - position).normalized());
        match direction {
            Some(direction) => {
                let was_greeting = self.actor.is_greeting();
                self.actor.update(direction, dt_ms, UNBOUNDED, &[], None);
                // A waypoint the clamp keeps out of reach counts as reached.
                if !was_greeting && self.actor.position() == position {
                    if let Some(skipped) = self.path.pop_front() {
                        debug!(
                            actor = %self.actor.name(),
                            x = skipped.x,
                            y = skipped.y,
                            "npc_waypoint_unreachable"
                        );
                    }
                }
            }
            None => {
                self.path.clear();
                self.task_timer_ms = 0.0;
                self.state = AiState::PerformingTask;
                self.idle_actor(dt_ms);
                self.notify();
            }
        }
    }

    fn perform_task(&mut self, dt_ms: f32) {
        self.task_timer_ms += dt_ms;
        let Some(task) = self.task.as_mut() else {
            self.state = AiState::Idle;
            self.notify();
            return;
        };
        task.advance(dt_ms);
        if !task.is_complete() {
            return;
        }

        let Some(task) = self.task.take() else {
            return;
        };
        let def = task.into_def();
        if !self.completed.contains(&def.id) {
            self.completed.push(def.id.clone());
        }
        if let Some(hook) = &def.on_complete {
            hook.call(&def);
        }
        info!(
            actor = %self.actor.name(),
            task = %def.id,
            elapsed_ms = self.task_timer_ms,
            completed = self.completed.len(),
            "npc_task_completed"
        );
        self.task_timer_ms = 0.0;
        self.waiting_elapsed_ms = 0.0;
        self.state = AiState::Waiting;
        self.notify();
    }

    fn step_toward_follow_target(&mut self, dt_ms: f32) {
        let Some(target) = self.follow_target else {
            self.idle_actor(dt_ms);
            return;
        };
        let delta = target - self.actor.position();
        if delta.length() <= FOLLOW_STOP_DISTANCE_PX {
            self.idle_actor(dt_ms);
            return;
        }
        match delta.normalized() {
            Some(direction) => self.actor.update(direction, dt_ms, UNBOUNDED, &[], None),
            None => self.idle_actor(dt_ms),
        }
    }

    /// Keeps idle and greeting animation running while the NPC stands still.
    fn idle_actor(&mut self, dt_ms: f32) {
        self.actor.update(Vec2::ZERO, dt_ms, UNBOUNDED, &[], None);
    }

    fn notify(&mut self) {
        if self.observer.is_none() {
            return;
        }
        let status = self.status();
        if let Some(observer) = self.observer.as_mut() {
            observer(&status);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;
    use crate::actor::{ActorConfig, SheetLayout};
    use crate::assets::AssetKey;

    fn npc(x: f32, y: f32) -> Actor {
        Actor::new(ActorConfig {
            name: "Orb".to_string(),
            sprite_sheet: AssetKey::new("characters/orb"),
            greeting_left: AssetKey::new("greetings/left"),
            greeting_right: AssetKey::new("greetings/right"),
            layout: SheetLayout::new(5, 2),
            frame_size: Some((100, 100)),
            scale: 0.5,
            position: Vec2::new(x, y),
            speed: 3.0,
        })
    }

    fn five_tasks() -> TaskCatalog {
        TaskCatalog::new([
            TaskDef::new("explore_house", TaskKind::Explore, 50.0),
            TaskDef::new("rest_by_tree", TaskKind::Rest, 80.0),
            TaskDef::new("check_chest", TaskKind::Gather, 30.0),
            TaskDef::new("cross_bridge", TaskKind::Explore, 20.0),
            TaskDef::new("farm_work", TaskKind::Gather, 100.0),
        ])
    }

    /// Ticks until the controller leaves `state` or the budget runs out.
    fn run_while(ai: &mut AiController, state: AiState, dt_ms: f32, max_ticks: usize) {
        for _ in 0..max_ticks {
            if ai.state() != state {
                return;
            }
            ai.update(dt_ms);
        }
    }

    #[test]
    fn targetless_task_goes_straight_to_performing() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), five_tasks(), 7);
        ai.update(16.0);
        assert_eq!(ai.state(), AiState::PerformingTask);
        assert!(ai.current_task().is_some());
        assert!(ai.path().is_empty());
    }

    #[test]
    fn empty_catalog_stays_idle() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), TaskCatalog::default(), 1);
        for _ in 0..10 {
            ai.update(16.0);
        }
        assert_eq!(ai.state(), AiState::Idle);
        assert!(ai.current_task().is_none());
    }

    #[test]
    fn set_task_rejects_unknown_ids() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), five_tasks(), 3);
        assert!(!ai.set_task("dance"));
        assert!(ai.current_task().is_none());
        assert!(ai.set_task("farm_work"));
        assert_eq!(ai.current_task().map(Task::id), Some("farm_work"));
        assert_eq!(ai.current_task().map(Task::progress), Some(0.0));
    }

    #[test]
    fn walks_the_path_then_performs() {
        let catalog = TaskCatalog::new([
            TaskDef::new("check_chest", TaskKind::Gather, 100.0).at(Vec2::new(30.0, 0.0))
        ]);
        let mut ai = AiController::with_seed(npc(0.0, 0.0), catalog, 11);
        ai.update(16.0);
        assert_eq!(ai.state(), AiState::MovingToLocation);
        assert_eq!(ai.path().back(), Some(&Vec2::new(30.0, 0.0)));

        run_while(&mut ai, AiState::MovingToLocation, 16.0, 100);
        assert_eq!(ai.state(), AiState::PerformingTask);
        assert!((ai.actor().position().x - 30.0).abs() < 3.0);
        assert_eq!(ai.task_timer_ms(), 0.0);
    }

    #[test]
    fn target_outside_movement_bounds_still_gets_performed() {
        let catalog = TaskCatalog::new([
            TaskDef::new("lean_on_wall", TaskKind::Rest, 100.0).at(Vec2::new(-50.0, 300.0))
        ]);
        let mut ai = AiController::with_seed(npc(30.0, 300.0), catalog, 2);
        ai.update(16.0);
        assert_eq!(ai.state(), AiState::MovingToLocation);

        run_while(&mut ai, AiState::MovingToLocation, 16.0, 200);
        assert_eq!(ai.state(), AiState::PerformingTask);
        assert_eq!(ai.actor().position().x, 0.0);

        run_while(&mut ai, AiState::PerformingTask, 50.0, 10);
        assert_eq!(ai.completed_tasks(), &["lean_on_wall".to_string()]);
    }

    #[test]
    fn completion_moves_to_waiting_and_cooldown_returns_to_idle() {
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let catalog = TaskCatalog::new([TaskDef::new("rest", TaskKind::Rest, 100.0)
            .on_complete(move |_| *counter.borrow_mut() += 1)]);
        let mut ai = AiController::with_seed(npc(0.0, 0.0), catalog, 5);

        ai.update(50.0);
        assert_eq!(ai.state(), AiState::PerformingTask);
        ai.update(50.0);
        assert_eq!(ai.state(), AiState::Waiting);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(ai.completed_tasks(), &["rest".to_string()]);
        assert!(ai.current_task().is_none());

        ai.update(1999.0);
        assert_eq!(ai.state(), AiState::Waiting);
        ai.update(1.0);
        assert_eq!(ai.state(), AiState::Idle);
    }

    #[test]
    fn progress_is_monotonic_while_performing() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), five_tasks(), 21);
        assert!(ai.set_task("farm_work"));
        let mut last = 0.0;
        while ai.state() != AiState::Waiting {
            ai.update(7.0);
            if let Some(task) = ai.current_task() {
                assert!(task.progress() >= last);
                assert!(task.progress() <= 100.0);
                last = task.progress();
            }
        }
        assert_eq!(ai.completed_tasks(), &["farm_work".to_string()]);
    }

    #[test]
    fn every_task_completes_before_the_cycle_resets() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), five_tasks(), 99);
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&statuses);
        ai.set_state_observer(move |status| sink.borrow_mut().push(status.clone()));

        let mut order = Vec::new();
        for _ in 0..5 {
            run_while(&mut ai, AiState::Idle, 10.0, 1);
            let id = ai.current_task().map(|task| task.id().to_string()).expect("task");
            order.push(id);
            run_while(&mut ai, AiState::PerformingTask, 10.0, 100);
            run_while(&mut ai, AiState::Waiting, 500.0, 10);
        }
        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(ai.completed_tasks().len(), 5);

        // sixth selection draws from the full catalog and clears the completed set
        ai.update(10.0);
        assert!(ai.current_task().is_some());
        assert!(ai.completed_tasks().is_empty());

        let statuses = statuses.borrow();
        assert!(statuses.iter().any(|status| status.state == AiState::Waiting));
        assert!(statuses.last().expect("status").completed.is_empty());
    }

    #[test]
    fn following_walks_toward_target_and_resumes_task() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), five_tasks(), 4);
        assert!(ai.set_task("check_chest"));
        ai.start_following(Vec2::new(200.0, 0.0));
        assert!(ai.is_following());

        for _ in 0..100 {
            ai.update(16.0);
        }
        let x = ai.actor().position().x;
        assert!(x >= 200.0 - FOLLOW_STOP_DISTANCE_PX - 3.0);
        assert!(x <= 200.0 - FOLLOW_STOP_DISTANCE_PX + 3.0);

        ai.stop_following();
        assert_eq!(ai.state(), AiState::Idle);
        assert_eq!(ai.current_task().map(Task::id), Some("check_chest"));
    }

    #[test]
    fn status_serializes_with_snake_case_state() {
        let mut ai = AiController::with_seed(npc(0.0, 0.0), five_tasks(), 8);
        assert!(ai.set_task("cross_bridge"));
        ai.update(10.0);
        let json = serde_json::to_value(ai.status()).expect("json");
        assert_eq!(json["state"], "performing_task");
        assert_eq!(json["task"]["kind"], "explore");
        assert_eq!(json["task"]["progress"], 50.0);
    }
}
