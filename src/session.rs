//! A designer session: the loaded floor plan plus the placement state.
//!
//! All intents are short synchronous critical sections on one mutex. Reading a
//! floor-plan file is the only suspend point; it happens outside the lock and
//! the result is applied in a single critical section (new plan, empty
//! collection), so no half-loaded state is ever visible.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::floor_plan::{AdjacencyLink, FloorPlan, FloorPlanError, FloorPlanId};
use crate::manager::{AddOutcome, MoveOutcome, PlacementManager, RotateOutcome};
use crate::model::{Door, FurnitureItem, FurnitureTemplate, Room};
use crate::types::{Point, Size};
use crate::validator::{PlacementConfig, PlacementReason, Verdict};

const EVENT_CAPACITY: usize = 64;

/// Reasons a floor-plan load did not take effect.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("another floor plan is still loading")]
    LoadInProgress,
    #[error("could not read floor plan from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] FloorPlanError),
}

/// State changes broadcast to renderers.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum PlacementEvent {
    FloorPlanLoaded {
        plan_id: FloorPlanId,
        rooms: usize,
        doors: usize,
    },
    ItemAdded {
        item: FurnitureItem,
    },
    AddRejected {
        template_id: String,
        reason_code: PlacementReason,
        reason: String,
    },
    ItemMoved {
        key: String,
        x: f64,
        y: f64,
    },
    ItemRemoved {
        key: String,
        reason_code: PlacementReason,
        reason: String,
    },
    ItemRotated {
        key: String,
        rotation: u16,
    },
    SelectionChanged {
        key: Option<String>,
    },
    Cleared {
        removed: usize,
    },
}

/// A placed item together with the footprint used for collision checks.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlacedView {
    #[serde(flatten)]
    pub item: FurnitureItem,
    pub effective: Size,
}

/// Everything a renderer needs to draw the current state.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub plan_id: FloorPlanId,
    pub rooms: Vec<Room>,
    pub doors: Vec<Door>,
    pub adjacency: Vec<AdjacencyLink>,
    pub placed: Vec<PlacedView>,
    pub selected: Option<String>,
    pub status: String,
}

struct Workspace {
    plan: FloorPlan,
    manager: PlacementManager,
}

/// Owns one floor plan and its placed furniture.
pub struct Session {
    state: Mutex<Workspace>,
    loading: AtomicBool,
    events: broadcast::Sender<PlacementEvent>,
}

/// Releases the in-flight flag when a load finishes, however it finishes.
struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new(plan: FloorPlan, config: PlacementConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(Workspace {
                plan,
                manager: PlacementManager::new(config),
            }),
            loading: AtomicBool::new(false),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Workspace> {
        // Operations never panic halfway through a mutation, so a poisoned
        // lock still guards a consistent workspace.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sends an event while the workspace lock is held.
    ///
    /// Publishing under the lock keeps the event order identical to the commit
    /// order, and lets `subscribe_with_snapshot` split the history exactly.
    /// `broadcast::Sender::send` never blocks.
    fn publish(&self, _held: &Workspace, event: PlacementEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PlacementEvent> {
        self.events.subscribe()
    }

    /// The current state plus a receiver for every later change.
    ///
    /// Both are taken in one critical section: a mutation is either in the
    /// snapshot or delivered as an event, never both and never neither.
    pub fn subscribe_with_snapshot(
        &self,
    ) -> (SessionSnapshot, broadcast::Receiver<PlacementEvent>) {
        let ws = self.lock();
        (snapshot_of(&ws), self.events.subscribe())
    }

    pub fn config(&self) -> PlacementConfig {
        *self.lock().manager.config()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&self.lock())
    }

    /// Replaces the floor plan and clears all placed items atomically.
    pub fn load_floor_plan(&self, plan: FloorPlan) {
        let event = PlacementEvent::FloorPlanLoaded {
            plan_id: plan.id(),
            rooms: plan.rooms().len(),
            doors: plan.doors().len(),
        };
        let mut ws = self.lock();
        ws.plan = plan;
        let removed = ws.manager.clear();
        info!(
            plan = ws.plan.id().0,
            rooms = ws.plan.rooms().len(),
            doors = ws.plan.doors().len(),
            removed,
            "floor plan loaded"
        );
        self.publish(&ws, event);
    }

    /// Parses and loads a floor-plan document. On error nothing changes.
    pub fn load_floor_plan_json(&self, text: &str) -> Result<FloorPlanId, LoadError> {
        let plan = FloorPlan::from_json_str(text)?;
        let id = plan.id();
        self.load_floor_plan(plan);
        Ok(id)
    }

    /// Reads a floor-plan file and loads it.
    ///
    /// Only one file load may be pending at a time; a concurrent call fails
    /// with `LoadError::LoadInProgress` and leaves the pending one alone.
    pub async fn load_floor_plan_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<FloorPlanId, LoadError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("floor-plan load rejected: another load is pending");
            return Err(LoadError::LoadInProgress);
        }
        let _guard = LoadGuard(&self.loading);

        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
        self.load_floor_plan_json(&text)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn add_furniture(&self, template: &FurnitureTemplate) -> AddOutcome {
        let mut guard = self.lock();
        let ws = &mut *guard;
        let outcome = ws.manager.add(template, &ws.plan);
        let event = match &outcome {
            AddOutcome::Added(item) => PlacementEvent::ItemAdded { item: item.clone() },
            AddOutcome::Rejected {
                template_id,
                verdict,
            } => PlacementEvent::AddRejected {
                template_id: template_id.clone(),
                reason_code: verdict.reason,
                reason: verdict.message(),
            },
        };
        self.publish(&guard, event);
        outcome
    }

    pub fn move_furniture(&self, key: &str, target: Point) -> MoveOutcome {
        let mut guard = self.lock();
        let ws = &mut *guard;
        let outcome = ws.manager.move_item(key, target, &ws.plan);
        match &outcome {
            MoveOutcome::Moved(item) => self.publish(
                &guard,
                PlacementEvent::ItemMoved {
                    key: item.key.clone(),
                    x: item.x,
                    y: item.y,
                },
            ),
            MoveOutcome::Removed {
                item,
                verdict,
                was_selected,
            } => {
                self.publish(
                    &guard,
                    PlacementEvent::ItemRemoved {
                        key: item.key.clone(),
                        reason_code: verdict.reason,
                        reason: verdict.message(),
                    },
                );
                if *was_selected {
                    self.publish(&guard, PlacementEvent::SelectionChanged { key: None });
                }
            }
            MoveOutcome::UnknownKey => {}
        }
        outcome
    }

    pub fn rotate_furniture(&self, key: &str, delta_degrees: f64) -> RotateOutcome {
        self.update_rotation(|manager| manager.rotate(key, delta_degrees))
    }

    pub fn rotate_furniture_by_drag(&self, key: &str, drag_distance: f64) -> RotateOutcome {
        self.update_rotation(|manager| manager.rotate_by_drag(key, drag_distance))
    }

    pub fn reset_rotation(&self, key: &str) -> RotateOutcome {
        self.update_rotation(|manager| manager.reset_rotation(key))
    }

    fn update_rotation(
        &self,
        update: impl FnOnce(&mut PlacementManager) -> RotateOutcome,
    ) -> RotateOutcome {
        let mut ws = self.lock();
        let outcome = update(&mut ws.manager);
        if let RotateOutcome::Rotated(item) = &outcome {
            self.publish(
                &ws,
                PlacementEvent::ItemRotated {
                    key: item.key.clone(),
                    rotation: item.rotation,
                },
            );
        }
        outcome
    }

    /// Returns the selected key after the change.
    pub fn select_furniture(&self, key: Option<&str>) -> Option<String> {
        let mut ws = self.lock();
        ws.manager.select(key);
        let selected = ws.manager.selected_key().map(str::to_owned);
        self.publish(
            &ws,
            PlacementEvent::SelectionChanged {
                key: selected.clone(),
            },
        );
        selected
    }

    pub fn clear_all(&self) -> usize {
        let mut ws = self.lock();
        let removed = ws.manager.clear();
        self.publish(&ws, PlacementEvent::Cleared { removed });
        removed
    }

    /// Validates a hypothetical placement without touching any state.
    ///
    /// With `key` set, the existing item's rotation is used unless `rotation`
    /// overrides it, and the item is excluded from its own collision check.
    pub fn validate_candidate(
        &self,
        template: &FurnitureTemplate,
        key: Option<&str>,
        candidate: Point,
        rotation: Option<u16>,
    ) -> Verdict {
        let ws = self.lock();
        let existing = key.and_then(|key| ws.manager.get(key));
        let mut item = match existing {
            Some(item) => item.clone(),
            None => template.instantiate(key.unwrap_or_default(), candidate),
        };
        if let Some(rotation) = rotation {
            item.rotation = crate::rotation::normalize_degrees(f64::from(rotation));
        }
        ws.manager.check(&item, candidate, &ws.plan)
    }

    /// Looks up a placed item by key.
    pub fn item(&self, key: &str) -> Option<FurnitureItem> {
        self.lock().manager.get(key).cloned()
    }
}

fn snapshot_of(ws: &Workspace) -> SessionSnapshot {
    SessionSnapshot {
        plan_id: ws.plan.id(),
        rooms: ws.plan.rooms().to_vec(),
        doors: ws.plan.doors().to_vec(),
        adjacency: ws.plan.adjacency_links(),
        placed: ws
            .manager
            .items()
            .iter()
            .map(|item| PlacedView {
                item: item.clone(),
                effective: item.effective_footprint(),
            })
            .collect(),
        selected: ws.manager.selected_key().map(str::to_owned),
        status: ws.manager.status_message().to_string(),
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FloorPlan::empty(), PlacementConfig::default())
    }
}
