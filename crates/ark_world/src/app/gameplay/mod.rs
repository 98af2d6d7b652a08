use ark_engine::{
    Actor, AiController, AiStatus, AssetCatalog, AssetKey, ContentDatabase, DrawContext,
    InputSnapshot, PlacedDecoration, Scene, Size, TaskCatalog, Vec2, World,
};
use tracing::{debug, info, warn};

use super::settings::GameSettings;

mod camera;
mod catalog;
mod hud;
mod minimap;
mod sim;
mod transition;

use sim::{Npc, Simulation};

pub(crate) fn build_scene(settings: &GameSettings, content: ContentDatabase) -> Box<dyn Scene> {
    Box::new(build_simulation(settings, content))
}

/// Built-in rooms and tasks, extended by whatever content files contributed.
fn build_simulation(settings: &GameSettings, content: ContentDatabase) -> Simulation {
    let mut world = World::new(catalog::builtin_rooms());
    for room in content.rooms {
        let name = room.name.clone();
        let index = world.add_room(room);
        info!(room = %name, index, "content_room_registered");
    }

    for placed in content.decorations {
        place_decoration(&mut world, placed);
    }
    let dropped = world.drop_dangling_doors();
    if dropped > 0 {
        warn!(dropped, "dangling_doors_dropped");
    }

    let home = world
        .rooms()
        .get(catalog::NPC_HOME_ROOM)
        .map(|room| Size::new(room.pixel_width(), room.pixel_height()))
        .unwrap_or_else(|| world.pixel_size());
    let mut tasks = TaskCatalog::new(catalog::builtin_tasks());
    for task in content.tasks {
        if let Some(target) = task.target.filter(|target| !is_inside(*target, home)) {
            warn!(
                task = %task.id,
                x = target.x,
                y = target.y,
                "task_target_outside_home_room"
            );
            continue;
        }
        tasks.upsert(task);
    }

    let npc_actor = Actor::new(catalog::npc_config());
    let npc = if settings.npc_ai_enabled {
        let mut controller = match settings.rng_seed {
            Some(seed) => AiController::with_seed(npc_actor, tasks, seed),
            None => AiController::new(npc_actor, tasks),
        };
        controller.set_state_observer(log_npc_status);
        Npc::Ai(controller)
    } else {
        info!("npc_ai_disabled");
        Npc::Manual(npc_actor)
    };

    Simulation::new(
        world,
        Actor::new(catalog::player_config()),
        npc,
        catalog::NPC_HOME_ROOM,
        Size::new(settings.window_width as f32, settings.window_height as f32),
    )
}

fn place_decoration(world: &mut World, placed: PlacedDecoration) {
    let Some(index) = world.room_index(&placed.room) else {
        warn!(
            room = %placed.room,
            decoration = %placed.decoration.kind,
            "decoration_room_unknown"
        );
        return;
    };
    let kind = placed.decoration.kind.clone();
    match world.add_decoration(index, placed.decoration) {
        Ok(()) => debug!(room = %placed.room, decoration = %kind, "content_decoration_placed"),
        Err(err) => warn!(error = %err, decoration = %kind, "content_decoration_rejected"),
    }
}

fn is_inside(point: Vec2, room: Size) -> bool {
    (0.0..=room.width).contains(&point.x) && (0.0..=room.height).contains(&point.y)
}

fn log_npc_status(status: &AiStatus) {
    match serde_json::to_string(status) {
        Ok(json) => info!(status = %json, "npc_status"),
        Err(err) => warn!(error = %err, "npc_status_encode_failed"),
    }
}

impl Scene for Simulation {
    fn required_assets(&self) -> Vec<AssetKey> {
        self.asset_keys()
    }

    fn update(&mut self, sim_time_ms: f64, input: &InputSnapshot, assets: &dyn AssetCatalog) {
        let (width, height) = input.window_size();
        self.set_view(width, height);
        self.tick(sim_time_ms, input, assets);
    }

    fn render(&mut self, ctx: &mut dyn DrawContext) {
        self.draw(ctx);
    }

    fn debug_lines(&self) -> Vec<String> {
        let player = self.player().position();
        let camera = self.camera().position();
        let view = self.view();
        let mut lines = vec![
            format!(
                "Room: {} ({})",
                self.world().current_room_name(),
                self.world().current_room_index()
            ),
            format!("Player: {:.0}, {:.0}", player.x, player.y),
            format!(
                "Camera: {:.0}, {:.0} ({:.0}x{:.0})",
                camera.x, camera.y, view.width, view.height
            ),
        ];
        let npc = self.npc().position();
        match self.ai() {
            Some(controller) => lines.push(format!(
                "NPC: {:.0}, {:.0} {:?} path={}",
                npc.x,
                npc.y,
                controller.state(),
                controller.path().len()
            )),
            None => lines.push(format!("NPC: {:.0}, {:.0} manual", npc.x, npc.y)),
        }
        if let Some(transition) = self.transition() {
            let direction = if transition.is_fading_in() { "in" } else { "out" };
            lines.push(format!("Fade {direction}: {:.2}", transition.alpha()));
        }
        lines
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!("Ark World - {}", self.world().current_room_name()))
    }
}

#[cfg(test)]
mod tests;
