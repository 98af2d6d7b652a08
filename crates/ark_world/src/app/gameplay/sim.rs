use ark_engine::{
    Actor, AiController, AiStatus, AssetCatalog, AssetKey, DoorLink, DrawContext, GreetingSide,
    InputSnapshot, Size, Vec2, World,
};
use tracing::{debug, info, warn};

use super::camera::Camera;
use super::hud::{draw_prompt, draw_task_panel, DoorAction, Prompt};
use super::minimap::{draw_minimap, MinimapView};
use super::transition::{FadeStep, Transition};

/// Extra reach around the player's feet box when looking for a door.
pub(crate) const DOOR_REACH_PX: f32 = 24.0;

/// The NPC is either driven by its task AI or stands in place.
#[derive(Debug)]
pub(crate) enum Npc {
    Ai(AiController),
    Manual(Actor),
}

impl Npc {
    pub(crate) fn actor(&self) -> &Actor {
        match self {
            Self::Ai(controller) => controller.actor(),
            Self::Manual(actor) => actor,
        }
    }

    fn actor_mut(&mut self) -> &mut Actor {
        match self {
            Self::Ai(controller) => controller.actor_mut(),
            Self::Manual(actor) => actor,
        }
    }
}

/// Per-tick orchestrator: input, world, both actors, AI, camera and the room fade.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    player: Actor,
    npc: Npc,
    npc_home_room: usize,
    camera: Camera,
    transition: Option<Transition>,
    last_timestamp_ms: Option<f64>,
    view: Size,
}

impl Simulation {
    pub(crate) fn new(
        world: World,
        player: Actor,
        npc: Npc,
        npc_home_room: usize,
        view: Size,
    ) -> Self {
        let mut simulation = Self {
            world,
            player,
            npc,
            npc_home_room,
            camera: Camera::default(),
            transition: None,
            last_timestamp_ms: None,
            view,
        };
        simulation.camera.snap_to(simulation.camera_target());
        simulation
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn player(&self) -> &Actor {
        &self.player
    }

    pub(crate) fn npc(&self) -> &Actor {
        self.npc.actor()
    }

    pub(crate) fn ai(&self) -> Option<&AiController> {
        match &self.npc {
            Npc::Ai(controller) => Some(controller),
            Npc::Manual(_) => None,
        }
    }

    pub(crate) fn camera(&self) -> &Camera {
        &self.camera
    }

    pub(crate) fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub(crate) fn view(&self) -> Size {
        self.view
    }

    /// Zero-sized windows (minimized) keep the last usable size.
    pub(crate) fn set_view(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.view = Size::new(width as f32, height as f32);
        }
    }

    pub(crate) fn npc_in_current_room(&self) -> bool {
        self.world.current_room_index() == self.npc_home_room
    }

    pub(crate) fn asset_keys(&self) -> Vec<AssetKey> {
        let mut keys: Vec<_> = self.world.asset_keys().into_iter().collect();
        for key in self
            .player
            .asset_keys()
            .into_iter()
            .chain(self.npc.actor().asset_keys())
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    pub(crate) fn tick(
        &mut self,
        timestamp_ms: f64,
        input: &InputSnapshot,
        assets: &dyn AssetCatalog,
    ) {
        let dt_ms = match self.last_timestamp_ms {
            Some(previous) => (timestamp_ms - previous).max(0.0) as f32,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        self.player.sync_assets(assets);
        self.npc.actor_mut().sync_assets(assets);

        if self.transition.is_some() {
            self.advance_transition();
            return;
        }

        if input.interact_pressed() && self.handle_interact() {
            return;
        }
        if input.greet_pressed() {
            self.try_greet(assets);
        }

        match &mut self.npc {
            Npc::Ai(controller) => {
                controller.set_follow_target(self.player.position());
                controller.update(dt_ms);
            }
            Npc::Manual(actor) => {
                let bounds = self.world.pixel_size();
                actor.update(Vec2::ZERO, dt_ms, bounds, &[], None);
            }
        }

        let others: Vec<&Actor> = if self.npc_in_current_room() {
            vec![self.npc.actor()]
        } else {
            Vec::new()
        };
        self.player.update(
            input.direction(),
            dt_ms,
            self.world.pixel_size(),
            &others,
            Some(&self.world),
        );

        let target = self.camera_target();
        self.camera.follow(target);
    }

    /// Returns true when a door was used; the rest of the tick is skipped.
    fn handle_interact(&mut self) -> bool {
        if let Some(door) = self.door_in_reach().cloned() {
            info!(
                from_room = self.world.current_room_index(),
                to_room = door.target_room,
                entry_point = %door.entry_point,
                "room_transition_started"
            );
            self.transition = Some(Transition::begin(door));
            return true;
        }

        if !self.npc_in_current_room() || !self.player.is_close_to(self.npc.actor()) {
            return false;
        }
        let player_position = self.player.position();
        if let Npc::Ai(controller) = &mut self.npc {
            if controller.is_following() {
                controller.stop_following();
            } else {
                controller.start_following(player_position);
            }
            debug!(following = controller.is_following(), "npc_follow_toggled");
        }
        false
    }

    fn try_greet(&mut self, assets: &dyn AssetCatalog) {
        if !self.npc_in_current_room() || !self.can_greet() {
            return;
        }
        let (player_side, npc_side) = if self.player.center().x < self.npc.actor().center().x {
            (GreetingSide::Left, GreetingSide::Right)
        } else {
            (GreetingSide::Right, GreetingSide::Left)
        };
        self.player.start_greeting(player_side, assets);
        self.npc.actor_mut().start_greeting(npc_side, assets);
        info!(player_side = ?player_side, "greeting_started");
    }

    fn can_greet(&self) -> bool {
        let npc = self.npc.actor();
        self.player.is_close_to(npc) && !self.player.is_greeting() && !npc.is_greeting()
    }

    fn advance_transition(&mut self) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        match transition.advance() {
            FadeStep::Continue => {}
            FadeStep::Swap(door) => self.swap_room(&door),
            FadeStep::Finished => {
                self.transition = None;
                debug!(room = self.world.current_room_index(), "room_transition_finished");
            }
        }
    }

    fn swap_room(&mut self, door: &DoorLink) {
        if let Err(err) = self.world.load_room(door.target_room) {
            warn!(error = %err, "room_swap_failed");
            return;
        }
        let entry = self
            .world
            .resolve_entry_point(door.target_room, &door.entry_point);
        self.player.set_position(entry);
        if let Npc::Ai(controller) = &mut self.npc {
            controller.stop_following();
        }
        let target = self.camera_target();
        self.camera.snap_to(target);
    }

    fn camera_target(&self) -> Vec2 {
        Camera::target_for(self.player.center(), self.view, self.world.pixel_size())
    }

    fn door_in_reach(&self) -> Option<&DoorLink> {
        let probe = self.player.collision_box().inflated(DOOR_REACH_PX);
        self.world
            .door_in_reach(&probe)
            .and_then(|decoration| decoration.door.as_ref())
    }

    pub(crate) fn prompt(&self) -> Option<Prompt> {
        if self.transition.is_some() {
            return None;
        }
        if let Some(door) = self.door_in_reach() {
            let action = if door.target_room > self.world.current_room_index() {
                DoorAction::Enter
            } else {
                DoorAction::Exit
            };
            return Some(Prompt::Door(action));
        }
        if !self.npc_in_current_room() {
            return None;
        }
        if !self.player.is_close_to(self.npc.actor()) {
            Some(Prompt::Approach)
        } else if self.can_greet() {
            Some(Prompt::Greet)
        } else {
            None
        }
    }

    pub(crate) fn npc_status(&self) -> Option<AiStatus> {
        self.ai().map(AiController::status)
    }

    /// World, NPC, player, prompt, minimap, task panel, then the fade on top.
    pub(crate) fn draw(&self, ctx: &mut dyn DrawContext) {
        let (width, height) = ctx.viewport_size();
        let viewport = self
            .camera
            .viewport(Size::new(width as f32, height as f32));
        let offset = viewport.origin();

        self.world.render(ctx, viewport);
        if self.npc_in_current_room() {
            self.npc.actor().render(ctx, offset);
        }
        self.player.render(ctx, offset);

        if let Some(prompt) = self.prompt() {
            draw_prompt(ctx, prompt);
        }
        draw_minimap(
            ctx,
            &MinimapView {
                world: self.world.pixel_size(),
                camera: viewport,
                player: self.player.center(),
                npc: self
                    .npc_in_current_room()
                    .then(|| self.npc.actor().center()),
            },
        );
        if let Some(status) = self.npc_status() {
            draw_task_panel(ctx, &status);
        }
        if let Some(transition) = &self.transition {
            transition.render(ctx);
        }
    }
}
