//! Built-in rooms, tasks and characters. Content files extend these at startup.

use ark_engine::{
    ActorConfig, AssetKey, Decoration, RoomTemplate, SheetLayout, Size, TaskDef, TaskKind,
    TileGrid, TileKind, Vec2,
};

pub(crate) const TILE_SIZE_PX: f32 = 64.0;
pub(crate) const OUTDOOR_ROOM: usize = 0;
pub(crate) const INDOOR_ROOM: usize = 1;
pub(crate) const NPC_HOME_ROOM: usize = OUTDOOR_ROOM;

pub(crate) const HOUSE_POSITION: Vec2 = Vec2::new(700.0, 300.0);
pub(crate) const HOUSE_EXIT_ENTRY: &str = "houseExit";
pub(crate) const MAIN_DOOR_ENTRY: &str = "mainDoor";
pub(crate) const HOUSE_EXIT_POSITION: Vec2 = Vec2::new(796.0, 512.0);
pub(crate) const MAIN_DOOR_POSITION: Vec2 = Vec2::new(320.0, 384.0);

pub(crate) const PLAYER_NAME: &str = "Gary";
pub(crate) const NPC_NAME: &str = "Orb";
pub(crate) const PLAYER_START: Vec2 = Vec2::new(200.0, 300.0);
pub(crate) const NPC_START: Vec2 = Vec2::new(600.0, 300.0);
const CHARACTER_SCALE: f32 = 0.075;
const CHARACTER_SPEED: f32 = 3.0;
const CHARACTER_LAYOUT: SheetLayout = SheetLayout::new(5, 2);

pub(crate) fn builtin_rooms() -> Vec<RoomTemplate> {
    vec![outdoor_room(), indoor_room()]
}

fn outdoor_room() -> RoomTemplate {
    let mut room = RoomTemplate::new(
        "Outdoor World",
        TileGrid::filled(30, 30, TILE_SIZE_PX, TileKind::Grass, true),
    )
    .with_area(5, 5, 6, 4, TileKind::Water, false)
    .with_area(3, 10, 20, 1, TileKind::Path, true)
    .with_area(12, 10, 1, 10, TileKind::Path, true)
    .with_area(12, 20, 10, 1, TileKind::Path, true)
    .with_area(22, 10, 1, 10, TileKind::Path, true)
    .with_area(18, 15, 4, 1, TileKind::Path, true)
    .with_area(8, 15, 4, 1, TileKind::Path, true)
    .with_area(15, 5, 4, 3, TileKind::Farmland, true)
    .with_area(20, 1, 5, 5, TileKind::Cliff, false)
    .with_area(5, 15, 8, 3, TileKind::Beach, true);

    for i in 0..5 {
        room = room.with_decoration(Decoration::new(
            "tree",
            Vec2::new(300.0 + i as f32 * 100.0, 150.0),
            Size::new(128.0, 128.0),
            AssetKey::new("decor/oak_tree"),
        ));
    }
    for i in 0..3 {
        room = room.with_decoration(Decoration::new(
            "small_tree",
            Vec2::new(350.0 + i as f32 * 80.0, 200.0),
            Size::new(64.0, 64.0),
            AssetKey::new("decor/oak_tree_small"),
        ));
    }
    room = room
        .with_decoration(
            Decoration::new(
                "house",
                HOUSE_POSITION,
                Size::new(192.0, 192.0),
                AssetKey::new("decor/house"),
            )
            .with_door(INDOOR_ROOM, MAIN_DOOR_ENTRY),
        )
        .with_decoration(
            Decoration::new(
                "bridge",
                Vec2::new(350.0, 350.0),
                Size::new(64.0, 128.0),
                AssetKey::new("decor/bridge_wood"),
            )
            .passable(),
        )
        .with_decoration(Decoration::new(
            "chest",
            Vec2::new(760.0, 480.0),
            Size::new(32.0, 32.0),
            AssetKey::new("decor/chest"),
        ));
    for i in 0..5 {
        room = room.with_decoration(Decoration::new(
            "fence",
            Vec2::new(400.0 + i as f32 * 32.0, 500.0),
            Size::new(32.0, 32.0),
            AssetKey::new("decor/fences"),
        ));
    }

    room.with_entry_point("default", Vec2::new(128.0, 128.0))
        .with_entry_point(HOUSE_EXIT_ENTRY, HOUSE_EXIT_POSITION)
}

fn indoor_room() -> RoomTemplate {
    let (width, height) = (10, 8);
    // One tile up from the bottom row.
    let exit_door = Vec2::new(
        304.0,
        (height - 1) as f32 * TILE_SIZE_PX - TILE_SIZE_PX + 32.0,
    );
    RoomTemplate::new(
        "IndoorHouse",
        TileGrid::filled(width, height, TILE_SIZE_PX, TileKind::Path, true),
    )
    .with_decoration(Decoration::new(
        "table",
        Vec2::new(192.0, 192.0),
        Size::new(64.0, 32.0),
        AssetKey::new("decor/chest"),
    ))
    .with_decoration(
        Decoration::new(
            "exit_door",
            exit_door,
            Size::new(192.0, 192.0),
            AssetKey::new("decor/house"),
        )
        .passable()
        .with_scale(0.33)
        .with_door(OUTDOOR_ROOM, HOUSE_EXIT_ENTRY),
    )
    .with_entry_point(MAIN_DOOR_ENTRY, MAIN_DOOR_POSITION)
}

pub(crate) fn builtin_tasks() -> Vec<TaskDef> {
    vec![
        TaskDef::new("explore_house", TaskKind::Explore, 5000.0)
            .named("Explore House", "Explore the house and its surroundings")
            .at(HOUSE_POSITION),
        TaskDef::new("rest_by_tree", TaskKind::Rest, 8000.0)
            .named("Rest by Tree", "Take a break under the shade of the tree")
            .at(Vec2::new(300.0, 150.0)),
        TaskDef::new("check_chest", TaskKind::Gather, 3000.0)
            .named("Check Chest", "Look inside the chest for valuable items")
            .at(Vec2::new(650.0, 400.0)),
        TaskDef::new("cross_bridge", TaskKind::Explore, 2000.0)
            .named("Cross Bridge", "Cross the bridge to the other side")
            .at(Vec2::new(350.0, 350.0)),
        TaskDef::new("farm_work", TaskKind::Gather, 10000.0)
            .named("Farm Work", "Work on the farm to grow crops")
            .at(Vec2::new(950.0, 350.0)),
    ]
}

fn character(name: &str, sheet: &str, position: Vec2) -> ActorConfig {
    ActorConfig {
        name: name.to_string(),
        sprite_sheet: AssetKey::new(sheet),
        greeting_left: AssetKey::new("characters/greeting_left"),
        greeting_right: AssetKey::new("characters/greeting_right"),
        layout: CHARACTER_LAYOUT,
        frame_size: None,
        scale: CHARACTER_SCALE,
        position,
        speed: CHARACTER_SPEED,
    }
}

pub(crate) fn player_config() -> ActorConfig {
    character(PLAYER_NAME, "characters/gary", PLAYER_START)
}

pub(crate) fn npc_config() -> ActorConfig {
    character(NPC_NAME, "characters/orb", NPC_START)
}

#[cfg(test)]
mod tests {
    use ark_engine::World;

    use super::*;

    #[test]
    fn builtin_rooms_link_doors_both_ways() {
        let rooms = builtin_rooms();
        let house_door = rooms[OUTDOOR_ROOM]
            .decorations
            .iter()
            .find_map(|decoration| decoration.door.as_ref())
            .expect("house door");
        assert_eq!(house_door.target_room, INDOOR_ROOM);
        assert!(rooms[INDOOR_ROOM]
            .entry_points
            .contains_key(&house_door.entry_point));

        let exit_door = rooms[INDOOR_ROOM]
            .decorations
            .iter()
            .find(|decoration| decoration.is_door())
            .expect("exit door");
        assert!(!exit_door.solid);
        let link = exit_door.door.as_ref().expect("link");
        assert_eq!(link.target_room, OUTDOOR_ROOM);
        assert!(rooms[OUTDOOR_ROOM].entry_points.contains_key(&link.entry_point));
    }

    #[test]
    fn outdoor_room_blocks_water_and_cliff() {
        let world = World::new(builtin_rooms());
        assert_eq!(world.current_room_name(), "Outdoor World");
        assert_eq!(world.decorations().len(), 16);
        assert!(!world.is_walkable(5.0 * TILE_SIZE_PX + 1.0, 5.0 * TILE_SIZE_PX + 1.0));
        assert!(!world.is_walkable(21.0 * TILE_SIZE_PX, 2.0 * TILE_SIZE_PX));
        assert!(world.is_walkable(PLAYER_START.x, PLAYER_START.y));
        assert!(world.is_walkable(HOUSE_EXIT_POSITION.x, HOUSE_EXIT_POSITION.y));
    }

    #[test]
    fn task_ids_are_unique() {
        let tasks = builtin_tasks();
        let mut ids: Vec<_> = tasks.iter().map(|task| task.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), tasks.len());
        assert!(tasks.iter().all(|task| task.target.is_some()));
    }
}
