//! Block catalogue: what the gamepad extension offers to a block editor.
//!
//! Serialises to the JSON shape editors expect (`blockType`, `acceptReporters`
//! and so on), which is why the field names are camelCase on the wire.
//! Arguments and menus are objects keyed by name, in declaration order.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub const EXTENSION_ID: &str = "gamepad";
pub const EXTENSION_NAME: &str = "Gamepad";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BlockType {
    #[serde(rename = "hat")]
    Hat,
    #[serde(rename = "Boolean")]
    Boolean,
    #[serde(rename = "reporter")]
    Reporter,
    #[serde(rename = "command")]
    Command,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArgumentInfo {
    #[serde(skip)]
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "defaultValue")]
    pub default_value: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<&'static str>,
}

impl ArgumentInfo {
    fn number(name: &'static str, default_value: &'static str) -> Self {
        Self {
            name,
            kind: "number",
            default_value,
            menu: None,
        }
    }

    fn with_menu(mut self, menu: &'static str) -> Self {
        self.menu = Some(menu);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockInfo {
    pub opcode: &'static str,
    #[serde(rename = "blockType")]
    pub block_type: BlockType,
    pub text: &'static str,
    #[serde(serialize_with = "keyed_by_name")]
    pub arguments: Vec<ArgumentInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuItem {
    pub text: String,
    pub value: i64,
}

/// A fixed menu serialises as a bare item array; one that accepts reporters
/// is wrapped as `{acceptReporters, items}`.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuInfo {
    pub name: &'static str,
    pub accept_reporters: bool,
    pub items: Vec<MenuItem>,
}

impl Serialize for MenuInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.accept_reporters {
            return self.items.serialize(serializer);
        }
        let mut menu = serializer.serialize_struct("MenuInfo", 2)?;
        menu.serialize_field("acceptReporters", &self.accept_reporters)?;
        menu.serialize_field("items", &self.items)?;
        menu.end()
    }
}

trait Named {
    fn name(&self) -> &'static str;
}

impl Named for ArgumentInfo {
    fn name(&self) -> &'static str {
        self.name
    }
}

impl Named for MenuInfo {
    fn name(&self) -> &'static str {
        self.name
    }
}

fn keyed_by_name<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Named + Serialize,
{
    serializer.collect_map(items.iter().map(|item| (item.name(), item)))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtensionInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub blocks: Vec<BlockInfo>,
    #[serde(serialize_with = "keyed_by_name")]
    pub menus: Vec<MenuInfo>,
}

impl ExtensionInfo {
    pub fn block(&self, opcode: &str) -> Option<&BlockInfo> {
        self.blocks.iter().find(|b| b.opcode == opcode)
    }

    pub fn menu(&self, name: &str) -> Option<&MenuInfo> {
        self.menus.iter().find(|m| m.name == name)
    }
}

/// Catalogue for a bank of `pad_count` pads; the pad menu lists `1..=pad_count`.
pub fn extension_info(pad_count: usize) -> ExtensionInfo {
    let pad = || ArgumentInfo::number("i", "1").with_menu("padMenu");

    let blocks = vec![
        BlockInfo {
            opcode: "buttonPressedReleased",
            block_type: BlockType::Hat,
            text: "button [b] [pr] of pad [i]",
            arguments: vec![
                ArgumentInfo::number("b", "1"),
                ArgumentInfo::number("pr", "1").with_menu("pressReleaseMenu"),
                pad(),
            ],
        },
        BlockInfo {
            opcode: "buttonDown",
            block_type: BlockType::Boolean,
            text: "button [b] of pad [i] is down",
            arguments: vec![ArgumentInfo::number("b", "1"), pad()],
        },
        BlockInfo {
            opcode: "axisMoved",
            block_type: BlockType::Hat,
            text: "axis [b] of pad [i] moved",
            arguments: vec![ArgumentInfo::number("b", "1"), pad()],
        },
        BlockInfo {
            opcode: "axisValue",
            block_type: BlockType::Reporter,
            text: "axis [b] of pad [i] value",
            arguments: vec![ArgumentInfo::number("b", "1"), pad()],
        },
        BlockInfo {
            opcode: "rumble",
            block_type: BlockType::Command,
            text: "rumble strong [s] and weak [w] for [t] sec. on pad [i]",
            arguments: vec![
                ArgumentInfo::number("s", "0.25"),
                ArgumentInfo::number("w", "0.5"),
                ArgumentInfo::number("t", "0.25"),
                pad(),
            ],
        },
    ];

    let menus = vec![
        MenuInfo {
            name: "pressReleaseMenu",
            accept_reporters: false,
            items: vec![
                MenuItem {
                    text: "press".to_string(),
                    value: 1,
                },
                MenuItem {
                    text: "release".to_string(),
                    value: 0,
                },
            ],
        },
        MenuInfo {
            name: "padMenu",
            accept_reporters: true,
            items: (1..=pad_count)
                .map(|n| MenuItem {
                    text: n.to_string(),
                    value: i64::try_from(n).unwrap_or(i64::MAX),
                })
                .collect(),
        },
    ];

    ExtensionInfo {
        id: EXTENSION_ID,
        name: EXTENSION_NAME,
        blocks,
        menus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_the_five_blocks() {
        let info = extension_info(4);
        let opcodes: Vec<_> = info.blocks.iter().map(|b| b.opcode).collect();
        assert_eq!(
            opcodes,
            ["buttonPressedReleased", "buttonDown", "axisMoved", "axisValue", "rumble"]
        );
        assert_eq!(
            info.block("buttonDown").map(|b| b.block_type),
            Some(BlockType::Boolean)
        );
    }

    #[test]
    fn pad_menu_follows_bank_size() {
        let info = extension_info(2);
        let pads = info.menu("padMenu").map(|m| m.items.len());
        assert_eq!(pads, Some(2));
        assert!(info.menu("padMenu").is_some_and(|m| m.accept_reporters));
    }

    #[test]
    fn rumble_defaults() {
        let info = extension_info(4);
        let defaults: Vec<_> = info
            .block("rumble")
            .map(|b| b.arguments.iter().map(|a| a.default_value).collect())
            .unwrap_or_default();
        assert_eq!(defaults, ["0.25", "0.5", "0.25", "1"]);
    }

    #[test]
    fn json_uses_editor_field_names() {
        let json = serde_json::to_value(extension_info(4)).unwrap_or_default();
        assert_eq!(json["id"], "gamepad");
        assert_eq!(json["blocks"][0]["blockType"], "hat");
        assert_eq!(json["blocks"][1]["blockType"], "Boolean");
        assert_eq!(json["blocks"][0]["arguments"]["pr"]["menu"], "pressReleaseMenu");
        assert_eq!(json["blocks"][0]["arguments"]["b"]["defaultValue"], "1");
        assert_eq!(json["blocks"][4]["arguments"]["s"]["type"], "number");
        assert_eq!(json["menus"]["padMenu"]["acceptReporters"], true);
        assert_eq!(json["menus"]["padMenu"]["items"][3]["value"], 4);
    }

    #[test]
    fn fixed_menu_is_a_bare_item_array() {
        let json = serde_json::to_value(extension_info(4)).unwrap_or_default();
        let press_release = &json["menus"]["pressReleaseMenu"];
        assert_eq!(press_release.as_array().map(Vec::len), Some(2));
        assert_eq!(press_release[0]["text"], "press");
        assert_eq!(press_release[0]["value"], 1);
        assert_eq!(press_release[1]["value"], 0);
    }

    #[test]
    fn arguments_keep_declaration_order() {
        let text = serde_json::to_string(&extension_info(4).blocks[4]).unwrap_or_default();
        let order: Vec<_> = ["\"s\"", "\"w\"", "\"t\"", "\"i\""]
            .iter()
            .map(|key| text.find(key))
            .collect();
        assert!(order.iter().all(Option::is_some), "{text}");
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{text}");
    }
}
