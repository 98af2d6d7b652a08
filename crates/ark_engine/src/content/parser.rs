use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::ai::{TaskDef, TaskKind};
use crate::assets::AssetKey;
use crate::geometry::{Size, Vec2};
use crate::world::{Decoration, RoomTemplate, TileGrid, TileKind, DEFAULT_TILE_SIZE};

use super::error::{ContentError, ContentErrorCode, SourceLocation};
use super::PlacedDecoration;

#[derive(Debug, Clone)]
pub(crate) enum ParsedDef {
    Task(TaskDef),
    Room(RoomTemplate),
    Decoration(PlacedDecoration),
}

impl ParsedDef {
    pub(crate) fn def_key(&self) -> String {
        match self {
            ParsedDef::Task(task) => format!("TaskDef:{}", task.id),
            ParsedDef::Room(room) => format!("RoomDef:{}", room.name),
            ParsedDef::Decoration(placed) => format!(
                "DecorationDef:{}:{}@{},{}",
                placed.room,
                placed.decoration.kind,
                placed.decoration.position.x,
                placed.decoration.position.y
            ),
        }
    }
}

const TASK_FIELDS: &[&str] = &[
    "id",
    "kind",
    "name",
    "description",
    "targetX",
    "targetY",
    "completionMs",
];
const ROOM_FIELDS: &[&str] = &["name", "width", "height", "fill", "areas", "decorations", "entries"];
const AREA_FIELDS: &[&str] = &["kind", "x", "y", "width", "height", "walkable"];
const DECORATION_FIELDS: &[&str] = &[
    "kind",
    "x",
    "y",
    "width",
    "height",
    "image",
    "solid",
    "scale",
    "doorRoom",
    "doorEntry",
];
const PLACED_DECORATION_FIELDS: &[&str] = &[
    "room",
    "kind",
    "x",
    "y",
    "width",
    "height",
    "image",
    "solid",
    "scale",
    "doorRoom",
    "doorEntry",
];
const ENTRY_FIELDS: &[&str] = &["key", "x", "y"];

/// Rooms larger than this are rejected as content mistakes.
const MAX_ROOM_TILES: u32 = 512;
const MAX_TARGET_PX: f32 = MAX_ROOM_TILES as f32 * DEFAULT_TILE_SIZE;

struct ParseScope<'a, 'input> {
    mod_id: &'a str,
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

type Fields<'a, 'input> = HashMap<String, Node<'a, 'input>>;

pub(crate) fn parse_defs_document(
    mod_id: &str,
    file_path: &Path,
    raw: &str,
) -> Result<Vec<ParsedDef>, ContentError> {
    let doc = Document::parse(raw).map_err(|error| ContentError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        mod_id: mod_id.to_string(),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let scope = ParseScope {
        mod_id,
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(scope.error(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    let mut defs = Vec::new();
    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "TaskDef" => defs.push(ParsedDef::Task(scope.parse_task(child)?)),
            "RoomDef" => defs.push(ParsedDef::Room(scope.parse_room(child)?)),
            "DecorationDef" => {
                defs.push(ParsedDef::Decoration(scope.parse_placed_decoration(child)?))
            }
            other => {
                return Err(scope.error(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{other}>; expected <TaskDef>, <RoomDef> or <DecorationDef>"
                    ),
                    child,
                ))
            }
        }
    }
    Ok(defs)
}

impl<'a, 'input> ParseScope<'a, 'input> {
    fn error(&self, code: ContentErrorCode, message: String, node: Node<'_, '_>) -> ContentError {
        ContentError::at_node(
            code,
            message,
            self.mod_id,
            self.file_path.to_path_buf(),
            self.doc,
            node,
        )
    }

    fn fields<'n>(
        &self,
        node: Node<'n, 'input>,
        def_type: &str,
        allowed: &[&str],
    ) -> Result<Fields<'n, 'input>, ContentError> {
        let mut fields = Fields::new();
        for field in node.children().filter(|child| child.is_element()) {
            let name = field.tag_name().name().to_string();
            if !allowed.contains(&name.as_str()) {
                return Err(self.error(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{name}> in <{def_type}>"),
                    field,
                ));
            }
            if fields.contains_key(&name) {
                return Err(self.error(
                    ContentErrorCode::DuplicateField,
                    format!("duplicate field <{name}> in <{def_type}>"),
                    field,
                ));
            }
            fields.insert(name, field);
        }
        Ok(fields)
    }

    fn required<'n>(
        &self,
        fields: &Fields<'n, 'input>,
        owner: Node<'_, '_>,
        def_type: &str,
        name: &str,
    ) -> Result<Node<'n, 'input>, ContentError> {
        fields.get(name).copied().ok_or_else(|| {
            self.error(
                ContentErrorCode::MissingField,
                format!("missing required field <{name}> in <{def_type}>"),
                owner,
            )
        })
    }

    fn text(&self, node: Node<'_, '_>) -> Result<String, ContentError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error(
                ContentErrorCode::MissingField,
                format!("field <{}> must not be empty", node.tag_name().name()),
                node,
            ));
        }
        Ok(value)
    }

    fn number<T: FromStr>(&self, node: Node<'_, '_>) -> Result<T, ContentError> {
        let value = self.text(node)?;
        value.parse::<T>().map_err(|_| {
            self.error(
                ContentErrorCode::InvalidValue,
                format!("<{}> value '{value}' is not a valid number", node.tag_name().name()),
                node,
            )
        })
    }

    fn finite(&self, node: Node<'_, '_>) -> Result<f32, ContentError> {
        let value: f32 = self.number(node)?;
        if !value.is_finite() {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!("<{}> must be finite", node.tag_name().name()),
                node,
            ));
        }
        Ok(value)
    }

    fn boolean(&self, node: Node<'_, '_>) -> Result<bool, ContentError> {
        match self.text(node)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "<{}> value '{other}' must be true or false",
                    node.tag_name().name()
                ),
                node,
            )),
        }
    }

    fn tile_kind(&self, node: Node<'_, '_>) -> Result<TileKind, ContentError> {
        let value = self.text(node)?;
        TileKind::from_name(&value).ok_or_else(|| {
            self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "invalid tile kind '{value}'; allowed values: grass, water, path, beach, farmland, cliff"
                ),
                node,
            )
        })
    }

    fn list_items<'n>(&self, node: Node<'n, 'input>) -> Result<Vec<Node<'n, 'input>>, ContentError> {
        let mut items = Vec::new();
        for child in node.children().filter(|child| child.is_element()) {
            if child.tag_name().name() != "li" {
                return Err(self.error(
                    ContentErrorCode::UnknownField,
                    format!(
                        "list <{}> may only contain <li> items",
                        node.tag_name().name()
                    ),
                    child,
                ));
            }
            items.push(child);
        }
        Ok(items)
    }

    fn parse_task(&self, node: Node<'_, 'input>) -> Result<TaskDef, ContentError> {
        let fields = self.fields(node, "TaskDef", TASK_FIELDS)?;
        let id = self.text(self.required(&fields, node, "TaskDef", "id")?)?;

        let kind_node = self.required(&fields, node, "TaskDef", "kind")?;
        let kind_text = self.text(kind_node)?;
        let kind = TaskKind::from_name(&kind_text).ok_or_else(|| {
            self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "invalid task kind '{kind_text}'; allowed values: idle, explore, gather, rest, socialize"
                ),
                kind_node,
            )
        })?;

        let name = self.text(self.required(&fields, node, "TaskDef", "name")?)?;
        let description = match fields.get("description") {
            Some(field) => self.text(*field)?,
            None => String::new(),
        };

        let completion_node = self.required(&fields, node, "TaskDef", "completionMs")?;
        let completion_ms = self.finite(completion_node)?;
        if completion_ms < 0.0 {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                "completionMs must be >= 0".to_string(),
                completion_node,
            ));
        }

        let target = match (fields.get("targetX"), fields.get("targetY")) {
            (Some(x), Some(y)) => {
                Some(Vec2::new(self.target_coord(*x)?, self.target_coord(*y)?))
            }
            (None, None) => None,
            _ => {
                return Err(self.error(
                    ContentErrorCode::MissingField,
                    "<targetX> and <targetY> must be given together".to_string(),
                    node,
                ))
            }
        };

        let mut task = TaskDef::new(id, kind, completion_ms).named(name, description);
        task.target = target;
        Ok(task)
    }

    fn parse_room(&self, node: Node<'_, 'input>) -> Result<RoomTemplate, ContentError> {
        let fields = self.fields(node, "RoomDef", ROOM_FIELDS)?;
        let name = self.text(self.required(&fields, node, "RoomDef", "name")?)?;
        let width = self.room_extent(self.required(&fields, node, "RoomDef", "width")?)?;
        let height = self.room_extent(self.required(&fields, node, "RoomDef", "height")?)?;
        let fill = match fields.get("fill") {
            Some(field) => self.tile_kind(*field)?,
            None => TileKind::Grass,
        };

        let mut room = RoomTemplate::new(
            name,
            TileGrid::filled(width, height, DEFAULT_TILE_SIZE, fill, default_walkable(fill)),
        );

        if let Some(areas) = fields.get("areas") {
            for item in self.list_items(*areas)? {
                let area = self.fields(item, "areas/li", AREA_FIELDS)?;
                let kind = self.tile_kind(self.required(&area, item, "areas/li", "kind")?)?;
                let (x, w) = self.area_span(&area, item, "x", "width", width)?;
                let (y, h) = self.area_span(&area, item, "y", "height", height)?;
                let walkable = match area.get("walkable") {
                    Some(field) => self.boolean(*field)?,
                    None => default_walkable(kind),
                };
                room.tiles.fill_area(x, y, w, h, kind, walkable);
            }
        }

        if let Some(decorations) = fields.get("decorations") {
            for item in self.list_items(*decorations)? {
                let decoration = self.fields(item, "decorations/li", DECORATION_FIELDS)?;
                room.decorations.push(self.parse_decoration(&decoration, item, "decorations/li")?);
            }
        }

        if let Some(entries) = fields.get("entries") {
            for item in self.list_items(*entries)? {
                let entry = self.fields(item, "entries/li", ENTRY_FIELDS)?;
                let key = self.text(self.required(&entry, item, "entries/li", "key")?)?;
                let x = self.finite(self.required(&entry, item, "entries/li", "x")?)?;
                let y = self.finite(self.required(&entry, item, "entries/li", "y")?)?;
                room.entry_points.insert(key, Vec2::new(x, y));
            }
        }

        Ok(room)
    }

    /// Area start and length along one axis; the span must lie inside `[0, limit]`.
    fn area_span(
        &self,
        area: &Fields<'_, 'input>,
        item: Node<'_, 'input>,
        start_field: &str,
        len_field: &str,
        limit: u32,
    ) -> Result<(i64, u32), ContentError> {
        let start_node = self.required(area, item, "areas/li", start_field)?;
        let len_node = self.required(area, item, "areas/li", len_field)?;
        let start: i64 = self.number(start_node)?;
        let len: u32 = self.number(len_node)?;
        if start < 0 || start >= i64::from(limit) {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!("<{start_field}> must be between 0 and {}", limit - 1),
                start_node,
            ));
        }
        if len == 0 || start + i64::from(len) > i64::from(limit) {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "<{len_field}> must be at least 1 and keep the area inside the room ({limit} tiles)"
                ),
                len_node,
            ));
        }
        Ok((start, len))
    }

    /// Task targets must lie on the largest room content can declare.
    fn target_coord(&self, node: Node<'_, '_>) -> Result<f32, ContentError> {
        let value = self.finite(node)?;
        if !(0.0..=MAX_TARGET_PX).contains(&value) {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "<{}> must be between 0 and {MAX_TARGET_PX}",
                    node.tag_name().name()
                ),
                node,
            ));
        }
        Ok(value)
    }

    fn room_extent(&self, node: Node<'_, '_>) -> Result<u32, ContentError> {
        let value: u32 = self.number(node)?;
        if value == 0 || value > MAX_ROOM_TILES {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "<{}> must be between 1 and {MAX_ROOM_TILES}",
                    node.tag_name().name()
                ),
                node,
            ));
        }
        Ok(value)
    }

    fn parse_placed_decoration(
        &self,
        node: Node<'_, 'input>,
    ) -> Result<PlacedDecoration, ContentError> {
        const OWNER: &str = "DecorationDef";
        let fields = self.fields(node, OWNER, PLACED_DECORATION_FIELDS)?;
        let room = self.text(self.required(&fields, node, OWNER, "room")?)?;
        let decoration = self.parse_decoration(&fields, node, OWNER)?;
        Ok(PlacedDecoration { room, decoration })
    }

    fn parse_decoration(
        &self,
        fields: &Fields<'_, 'input>,
        item: Node<'_, 'input>,
        owner: &str,
    ) -> Result<Decoration, ContentError> {
        let kind = self.text(self.required(fields, item, owner, "kind")?)?;
        let x = self.finite(self.required(fields, item, owner, "x")?)?;
        let y = self.finite(self.required(fields, item, owner, "y")?)?;
        let width = self.finite(self.required(fields, item, owner, "width")?)?;
        let height = self.finite(self.required(fields, item, owner, "height")?)?;

        let image_node = self.required(fields, item, owner, "image")?;
        let image = AssetKey::new(self.text(image_node)?);
        if let Err(err) = image.validate() {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!("invalid image key '{image}': {err}"),
                image_node,
            ));
        }

        let mut decoration = Decoration::new(kind, Vec2::new(x, y), Size::new(width, height), image);
        if let Some(field) = fields.get("solid") {
            decoration.solid = self.boolean(*field)?;
        }
        if let Some(field) = fields.get("scale") {
            let scale = self.finite(*field)?;
            if scale <= 0.0 {
                return Err(self.error(
                    ContentErrorCode::InvalidValue,
                    "scale must be > 0".to_string(),
                    *field,
                ));
            }
            decoration.scale = scale;
        }
        match (fields.get("doorRoom"), fields.get("doorEntry")) {
            (Some(room), Some(entry)) => {
                let target_room: usize = self.number(*room)?;
                decoration = decoration.with_door(target_room, self.text(*entry)?);
            }
            (None, None) => {}
            _ => {
                return Err(self.error(
                    ContentErrorCode::MissingField,
                    "<doorRoom> and <doorEntry> must be given together".to_string(),
                    item,
                ))
            }
        }
        Ok(decoration)
    }
}

fn default_walkable(kind: TileKind) -> bool {
    !matches!(kind, TileKind::Water | TileKind::Cliff)
}
