use ark_engine::{
    ActorConfig, AiState, AnimationState, Decoration, DrawCommand, GreetingSide, ImageSizes,
    InputAction, RecordingContext, RoomTemplate, TaskDef, TaskKind, TileGrid,
};

use super::catalog::{
    HOUSE_EXIT_POSITION, INDOOR_ROOM, MAIN_DOOR_POSITION, NPC_NAME, OUTDOOR_ROOM,
};
use super::hud::{DoorAction, Prompt};
use super::transition::FADE_FRAMES;
use super::*;

const TICK_MS: f64 = 16.0;

/// 5x2 sheets of 1000 px frames: 75 px sprites at the catalog scale.
fn assets() -> ImageSizes {
    let mut images = ImageSizes::new();
    images.insert("characters/gary", 5000, 2000);
    images.insert("characters/orb", 5000, 2000);
    images.insert("characters/greeting_left", 500, 100);
    images.insert("characters/greeting_right", 500, 100);
    images.insert("decor/house", 192, 192);
    images
}

fn placed(config: ActorConfig, position: Vec2) -> Actor {
    Actor::new(ActorConfig { position, ..config })
}

fn manual_sim(player: Vec2, npc: Vec2) -> Simulation {
    Simulation::new(
        World::new(catalog::builtin_rooms()),
        placed(catalog::player_config(), player),
        Npc::Manual(placed(catalog::npc_config(), npc)),
        catalog::NPC_HOME_ROOM,
        Size::new(800.0, 600.0),
    )
}

fn ai_sim(player: Vec2, seed: u64) -> Simulation {
    let controller = AiController::with_seed(
        Actor::new(catalog::npc_config()),
        TaskCatalog::new(catalog::builtin_tasks()),
        seed,
    );
    Simulation::new(
        World::new(catalog::builtin_rooms()),
        placed(catalog::player_config(), player),
        Npc::Ai(controller),
        catalog::NPC_HOME_ROOM,
        Size::new(800.0, 600.0),
    )
}

fn idle() -> InputSnapshot {
    InputSnapshot::empty().with_window_size((800, 600))
}

fn interact() -> InputSnapshot {
    idle().with_interact_pressed(true)
}

fn greet() -> InputSnapshot {
    idle().with_greet_pressed(true)
}

fn run_ticks(sim: &mut Simulation, clock: &mut f64, count: usize, input: &InputSnapshot) {
    let images = assets();
    for _ in 0..count {
        *clock += TICK_MS;
        sim.tick(*clock, input, &images);
    }
}

fn render(sim: &Simulation) -> RecordingContext {
    let mut ctx = RecordingContext::new(800, 600, assets());
    sim.draw(&mut ctx);
    ctx
}

#[test]
fn prompt_asks_player_to_approach_when_far() {
    let mut sim = manual_sim(catalog::PLAYER_START, catalog::NPC_START);
    sim.tick(0.0, &idle(), &assets());
    assert_eq!(sim.prompt(), Some(Prompt::Approach));
    let ctx = render(&sim);
    assert!(ctx
        .texts()
        .any(|text| text == "Use arrow keys to move Gary close to Orb"));
}

#[test]
fn greeting_gives_each_actor_the_side_facing_the_other() {
    let mut sim = manual_sim(Vec2::new(520.0, 700.0), Vec2::new(600.0, 700.0));
    let images = assets();
    sim.tick(0.0, &idle(), &images);
    assert_eq!(sim.prompt(), Some(Prompt::Greet));

    sim.tick(16.0, &greet(), &images);
    assert_eq!(sim.player().greeting_side(), Some(GreetingSide::Left));
    assert_eq!(sim.npc().greeting_side(), Some(GreetingSide::Right));
    assert_eq!(sim.prompt(), None);
}

#[test]
fn greeting_lasts_two_seconds_of_tick_time() {
    let mut sim = manual_sim(Vec2::new(520.0, 700.0), Vec2::new(600.0, 700.0));
    let images = assets();
    sim.tick(0.0, &greet(), &images);
    assert!(sim.player().is_greeting());

    sim.tick(1999.0, &idle(), &images);
    assert!(sim.player().is_greeting());
    assert!(sim.npc().is_greeting());

    sim.tick(2001.0, &idle(), &images);
    assert!(!sim.player().is_greeting());
    assert!(!sim.npc().is_greeting());
    assert_eq!(sim.player().state(), AnimationState::Idle);
}

#[test]
fn greeting_waits_for_overlay_images() {
    let mut sim = manual_sim(Vec2::new(520.0, 700.0), Vec2::new(600.0, 700.0));
    let mut images = ImageSizes::new();
    images.insert("characters/gary", 5000, 2000);
    images.insert("characters/orb", 5000, 2000);
    sim.tick(0.0, &greet(), &images);
    assert!(!sim.player().is_greeting());
    assert!(sim.player().has_pending_greeting());

    sim.tick(16.0, &idle(), &assets());
    assert!(sim.player().is_greeting());
}

#[test]
fn player_is_stopped_by_the_npc_feet_box() {
    let mut sim = manual_sim(Vec2::new(520.0, 700.0), Vec2::new(600.0, 700.0));
    let mut clock = 0.0;
    let right = idle().with_action_down(InputAction::MoveRight, true);
    run_ticks(&mut sim, &mut clock, 30, &right);

    assert_eq!(sim.player().position(), Vec2::new(553.0, 700.0));
    assert!(!sim
        .player()
        .collision_box()
        .intersects(&sim.npc().collision_box()));
}

#[test]
fn player_cannot_walk_into_water() {
    // Feet box starts just left of the lake at tile x 5.
    let mut sim = manual_sim(Vec2::new(240.0, 300.0), catalog::NPC_START);
    let mut clock = 0.0;
    let right = idle().with_action_down(InputAction::MoveRight, true);
    run_ticks(&mut sim, &mut clock, 40, &right);

    let feet = sim.player().collision_box();
    assert!(feet.right() <= 320.0, "feet entered water at {}", feet.right());
    assert!(sim.player().position().x > 240.0);
}

#[test]
fn door_transition_swaps_room_at_full_black() {
    let mut sim = manual_sim(Vec2::new(760.0, 460.0), catalog::NPC_START);
    let images = assets();
    let mut clock = 0.0;
    sim.tick(clock, &idle(), &images);
    assert_eq!(sim.prompt(), Some(Prompt::Door(DoorAction::Enter)));

    clock += TICK_MS;
    sim.tick(clock, &interact(), &images);
    assert!(sim.transition().is_some());

    run_ticks(&mut sim, &mut clock, (FADE_FRAMES - 1) as usize, &idle());
    assert_eq!(sim.world().current_room_index(), OUTDOOR_ROOM);
    assert!(sim.transition().is_some_and(|fade| fade.alpha() < 1.0));

    run_ticks(&mut sim, &mut clock, 1, &idle());
    assert_eq!(sim.world().current_room_index(), INDOOR_ROOM);
    assert_eq!(sim.player().position(), MAIN_DOOR_POSITION);
    assert_eq!(sim.transition().map(|fade| fade.alpha()), Some(1.0));
    assert_eq!(sim.camera().position(), Vec2::ZERO);

    run_ticks(&mut sim, &mut clock, FADE_FRAMES as usize, &idle());
    assert!(sim.transition().is_none());
    assert_eq!(sim.prompt(), Some(Prompt::Door(DoorAction::Exit)));
}

#[test]
fn input_is_ignored_while_fading() {
    let mut sim = manual_sim(Vec2::new(760.0, 460.0), catalog::NPC_START);
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 1, &interact());
    let start = sim.player().position();
    let left = idle().with_action_down(InputAction::MoveLeft, true);
    run_ticks(&mut sim, &mut clock, 5, &left);
    assert_eq!(sim.player().position(), start);
    assert_eq!(sim.prompt(), None);
}

#[test]
fn exiting_the_house_returns_to_the_house_exit() {
    let mut sim = manual_sim(Vec2::new(760.0, 460.0), catalog::NPC_START);
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 1, &interact());
    run_ticks(&mut sim, &mut clock, (FADE_FRAMES * 2) as usize, &idle());
    assert_eq!(sim.world().current_room_index(), INDOOR_ROOM);

    run_ticks(&mut sim, &mut clock, 1, &interact());
    run_ticks(&mut sim, &mut clock, FADE_FRAMES as usize, &idle());
    assert_eq!(sim.world().current_room_index(), OUTDOOR_ROOM);
    assert_eq!(sim.player().position(), HOUSE_EXIT_POSITION);
}

#[test]
fn npc_is_hidden_and_ignored_in_other_rooms() {
    let mut sim = manual_sim(Vec2::new(760.0, 460.0), catalog::NPC_START);
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 1, &interact());
    run_ticks(&mut sim, &mut clock, (FADE_FRAMES * 2) as usize, &idle());
    assert!(!sim.npc_in_current_room());

    let ctx = render(&sim);
    assert!(ctx
        .images_drawn()
        .all(|(key, _)| key.as_str() != "characters/orb"));
    assert!(ctx
        .images_drawn()
        .any(|(key, _)| key.as_str() == "characters/gary"));
    let dots = ctx
        .commands()
        .iter()
        .filter(|command| matches!(command, DrawCommand::FillCircle { .. }))
        .count();
    assert_eq!(dots, 1);
}

#[test]
fn interact_near_npc_toggles_following() {
    let mut sim = ai_sim(Vec2::new(520.0, 300.0), 7);
    let mut clock = 0.0;
    sim.tick(clock, &idle(), &assets());
    assert!(sim.player().is_close_to(sim.npc()));

    run_ticks(&mut sim, &mut clock, 1, &interact());
    assert_eq!(sim.ai().map(AiController::state), Some(AiState::Following));

    run_ticks(&mut sim, &mut clock, 1, &interact());
    assert!(sim.ai().is_some_and(|ai| !ai.is_following()));
}

#[test]
fn npc_completes_tasks_over_time() {
    let mut sim = ai_sim(catalog::PLAYER_START, 11);
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 3000, &idle());

    let ai = sim.ai().expect("ai");
    assert!(!ai.completed_tasks().is_empty());
    if let Some(task) = ai.current_task() {
        assert!((0.0..=100.0).contains(&task.progress()));
    }
    let ctx = render(&sim);
    assert!(ctx.texts().any(|text| text == format!("{NPC_NAME}'s Tasks")));
}

#[test]
fn render_draws_fade_last() {
    let mut sim = manual_sim(Vec2::new(760.0, 460.0), catalog::NPC_START);
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 1, &interact());
    run_ticks(&mut sim, &mut clock, 5, &idle());

    let ctx = render(&sim);
    assert_eq!(
        ctx.commands().last(),
        Some(&DrawCommand::FillRect {
            rect: ark_engine::Rect::new(0.0, 0.0, 800.0, 600.0),
            color: [0, 0, 0, 64],
        })
    );
    assert!(matches!(
        ctx.commands().first(),
        Some(DrawCommand::FillRect { .. })
    ));
}

#[test]
fn camera_stays_clamped_to_world() {
    let mut sim = manual_sim(Vec2::new(10.0, 10.0), catalog::NPC_START);
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 50, &idle());
    assert_eq!(sim.camera().position(), Vec2::ZERO);
}

#[test]
fn non_increasing_timestamps_do_not_advance_time() {
    let mut sim = manual_sim(Vec2::new(520.0, 700.0), Vec2::new(600.0, 700.0));
    let images = assets();
    sim.tick(5000.0, &greet(), &images);
    sim.tick(4000.0, &idle(), &images);
    sim.tick(4000.0, &idle(), &images);
    assert!(sim.player().is_greeting());
}

#[test]
fn build_merges_content_rooms_and_tasks() {
    let content = ContentDatabase {
        tasks: vec![
            TaskDef::new("check_chest", TaskKind::Rest, 1000.0).named("Nap", "Nap on the chest"),
            TaskDef::new("fish", TaskKind::Gather, 4000.0),
        ],
        rooms: vec![RoomTemplate::new(
            "Cellar",
            TileGrid::filled(4, 4, 64.0, ark_engine::TileKind::Path, true),
        )],
        ..ContentDatabase::default()
    };
    let settings = GameSettings {
        rng_seed: Some(3),
        ..GameSettings::default()
    };
    let sim = build_simulation(&settings, content);

    assert_eq!(sim.world().room_count(), 3);
    assert_eq!(sim.world().current_room_index(), OUTDOOR_ROOM);
    let catalog = sim.ai().expect("ai").catalog();
    assert_eq!(catalog.len(), 6);
    assert_eq!(
        catalog.get("check_chest").map(|task| task.kind),
        Some(TaskKind::Rest)
    );
}

fn greenhouse_content() -> ContentDatabase {
    let greenhouse = RoomTemplate::new(
        "Greenhouse",
        TileGrid::filled(6, 4, 64.0, ark_engine::TileKind::Farmland, true),
    )
    .with_decoration(
        Decoration::new(
            "broken_door",
            Vec2::new(300.0, 100.0),
            Size::new(64.0, 64.0),
            AssetKey::new("decor/house"),
        )
        .passable()
        .with_door(7, "default"),
    )
    .with_entry_point("default", Vec2::new(64.0, 128.0));
    let gate = Decoration::new(
        "gate",
        Vec2::new(180.0, 330.0),
        Size::new(64.0, 64.0),
        AssetKey::new("decor/house"),
    )
    .passable()
    .with_door(2, "default");

    ContentDatabase {
        tasks: vec![
            TaskDef::new("dig_far_away", TaskKind::Gather, 100.0).at(Vec2::new(5000.0, 300.0)),
            TaskDef::new("water_plants", TaskKind::Gather, 100.0).at(Vec2::new(1000.0, 380.0)),
        ],
        rooms: vec![greenhouse],
        decorations: vec![
            PlacedDecoration {
                room: "Outdoor World".to_string(),
                decoration: gate.clone(),
            },
            PlacedDecoration {
                room: "Attic".to_string(),
                decoration: gate,
            },
        ],
    }
}

#[test]
fn content_door_leads_into_content_room() {
    let settings = GameSettings {
        npc_ai_enabled: false,
        ..GameSettings::default()
    };
    let mut sim = build_simulation(&settings, greenhouse_content());
    assert_eq!(sim.world().room_count(), 3);
    assert_eq!(sim.world().decorations().len(), 17);
    assert!(sim.world().rooms()[2]
        .decorations
        .iter()
        .all(|decoration| !decoration.is_door()));

    let mut clock = 0.0;
    sim.tick(clock, &idle(), &assets());
    assert_eq!(sim.prompt(), Some(Prompt::Door(DoorAction::Enter)));

    run_ticks(&mut sim, &mut clock, 1, &interact());
    run_ticks(&mut sim, &mut clock, FADE_FRAMES as usize, &idle());
    assert_eq!(sim.world().current_room_index(), 2);
    assert_eq!(sim.world().current_room_name(), "Greenhouse");
    assert_eq!(sim.player().position(), Vec2::new(64.0, 128.0));

    run_ticks(&mut sim, &mut clock, FADE_FRAMES as usize, &idle());
    assert!(sim.transition().is_none());
}

#[test]
fn tasks_aimed_outside_the_home_room_are_dropped() {
    let settings = GameSettings {
        rng_seed: Some(1),
        ..GameSettings::default()
    };
    let sim = build_simulation(&settings, greenhouse_content());
    let catalog = sim.ai().expect("ai").catalog();
    assert!(catalog.get("dig_far_away").is_none());
    assert!(catalog.get("water_plants").is_some());
    assert_eq!(catalog.len(), 6);
}

#[test]
fn disabled_ai_leaves_npc_standing() {
    let settings = GameSettings {
        npc_ai_enabled: false,
        ..GameSettings::default()
    };
    let mut sim = build_simulation(&settings, ContentDatabase::default());
    assert!(sim.ai().is_none());
    let mut clock = 0.0;
    run_ticks(&mut sim, &mut clock, 100, &idle());
    assert_eq!(sim.npc().position(), catalog::NPC_START);
}

#[test]
fn scene_reports_every_drawable_asset() {
    let sim = build_simulation(&GameSettings::default(), ContentDatabase::default());
    let keys = sim.required_assets();
    for expected in [
        "characters/gary",
        "characters/orb",
        "characters/greeting_left",
        "tiles/grass_middle",
        "decor/house",
        "decor/fences",
    ] {
        assert!(
            keys.iter().any(|key| key.as_str() == expected),
            "missing {expected}"
        );
    }
    assert_eq!(
        sim.debug_title().as_deref(),
        Some("Ark World - Outdoor World")
    );
}
