use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Idle,
    Explore,
    Gather,
    Rest,
    Socialize,
}

impl TaskKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "idle" => Some(Self::Idle),
            "explore" => Some(Self::Explore),
            "gather" => Some(Self::Gather),
            "rest" => Some(Self::Rest),
            "socialize" => Some(Self::Socialize),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Explore => "explore",
            Self::Gather => "gather",
            Self::Rest => "rest",
            Self::Socialize => "socialize",
        }
    }
}

/// Callback run once when a task instance reaches 100%.
#[derive(Clone)]
pub struct CompletionHook(Rc<dyn Fn(&TaskDef)>);

impl CompletionHook {
    pub fn new(hook: impl Fn(&TaskDef) + 'static) -> Self {
        Self(Rc::new(hook))
    }

    pub fn call(&self, task: &TaskDef) {
        (self.0)(task)
    }
}

impl fmt::Debug for CompletionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompletionHook(..)")
    }
}

#[derive(Debug, Clone)]
pub struct TaskDef {
    pub id: String,
    pub kind: TaskKind,
    pub name: String,
    pub description: String,
    /// Where the NPC walks before performing. `None` performs in place.
    pub target: Option<Vec2>,
    pub completion_ms: f32,
    pub on_complete: Option<CompletionHook>,
}

impl TaskDef {
    pub fn new(id: impl Into<String>, kind: TaskKind, completion_ms: f32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            description: String::new(),
            target: None,
            completion_ms,
            on_complete: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.name = name.into();
        self.description = description.into();
        self
    }

    pub fn at(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    pub fn on_complete(mut self, hook: impl Fn(&TaskDef) + 'static) -> Self {
        self.on_complete = Some(CompletionHook::new(hook));
        self
    }
}

/// One assignment of a [`TaskDef`]. Progress only moves forward.
#[derive(Debug, Clone)]
pub struct Task {
    def: TaskDef,
    progress: f32,
}

impl Task {
    pub fn new(def: TaskDef) -> Self {
        Self { def, progress: 0.0 }
    }

    pub fn def(&self) -> &TaskDef {
        &self.def
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    /// Percentage in `[0, 100]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }

    pub(crate) fn advance(&mut self, dt_ms: f32) {
        if !self.def.completion_ms.is_finite() || self.def.completion_ms <= 0.0 {
            self.progress = 100.0;
            return;
        }
        let step = (dt_ms / self.def.completion_ms * 100.0).max(0.0);
        if step.is_finite() {
            self.progress = (self.progress + step).min(100.0);
        }
    }

    pub(crate) fn into_def(self) -> TaskDef {
        self.def
    }
}

/// Ordered task definitions, unique by id.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    tasks: Vec<TaskDef>,
}

impl TaskCatalog {
    /// Later duplicates replace earlier ones in place.
    pub fn new(tasks: impl IntoIterator<Item = TaskDef>) -> Self {
        let mut catalog = Self::default();
        for task in tasks {
            catalog.upsert(task);
        }
        catalog
    }

    pub fn upsert(&mut self, task: TaskDef) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TaskDef> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn tasks(&self) -> &[TaskDef] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_capped() {
        let mut task = Task::new(TaskDef::new("rest", TaskKind::Rest, 1000.0));
        let mut last = task.progress();
        for dt in [100.0, 0.0, -50.0, 400.0, 800.0, 100.0] {
            task.advance(dt);
            assert!(task.progress() >= last);
            assert!((0.0..=100.0).contains(&task.progress()));
            last = task.progress();
        }
        assert!(task.is_complete());
        assert_eq!(task.progress(), 100.0);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut task = Task::new(TaskDef::new("wave", TaskKind::Socialize, 0.0));
        task.advance(0.0);
        assert!(task.is_complete());
    }

    #[test]
    fn catalog_upsert_replaces_by_id() {
        let mut catalog = TaskCatalog::new([
            TaskDef::new("a", TaskKind::Explore, 10.0),
            TaskDef::new("b", TaskKind::Gather, 10.0),
        ]);
        catalog.upsert(TaskDef::new("a", TaskKind::Rest, 99.0));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.tasks()[0].kind, TaskKind::Rest);
        assert!(catalog.get("missing").is_none());
    }
}
