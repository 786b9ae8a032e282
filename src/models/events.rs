//! Сырые события ввода, поступающие от хоста.

use serde::{Deserialize, Serialize};

/// Событие указателя в том виде, в котором его отдаёт платформа.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    /// Движение мыши в режиме pointer-lock.
    Move {
        /// `None` when the platform does not report movement.
        #[serde(rename = "movementX", alias = "movement_x", default)]
        movement_x: Option<f64>,
        #[serde(rename = "movementY", alias = "movement_y", default)]
        movement_y: Option<f64>,
    },
    /// Касание: абсолютные координаты страницы.
    Touch {
        #[serde(rename = "pageX", alias = "page_x")]
        page_x: f64,
        #[serde(rename = "pageY", alias = "page_y")]
        page_y: f64,
    },
    /// Нажатие кнопки мыши: переключает захват указателя.
    Press,
}

impl PointerEvent {
    pub fn movement(movement_x: f64, movement_y: f64) -> Self {
        PointerEvent::Move {
            movement_x: Some(movement_x),
            movement_y: Some(movement_y),
        }
    }

    pub fn touch(page_x: f64, page_y: f64) -> Self {
        PointerEvent::Touch { page_x, page_y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_browser_style_move() {
        let raw = r#"{ "type": "move", "movementX": 3.0, "movementY": -2.0 }"#;
        let event: PointerEvent = serde_json::from_str(raw).expect("deserialize move");
        assert_eq!(event, PointerEvent::movement(3.0, -2.0));
    }

    #[test]
    fn missing_movement_fields_are_none() {
        let raw = r#"{ "type": "move" }"#;
        let event: PointerEvent = serde_json::from_str(raw).expect("deserialize bare move");
        assert_eq!(
            event,
            PointerEvent::Move {
                movement_x: None,
                movement_y: None
            }
        );
    }

    #[test]
    fn accepts_snake_case_touch_fields() {
        let raw = r#"{ "type": "touch", "page_x": 400.0, "page_y": 120.0 }"#;
        let event: PointerEvent = serde_json::from_str(raw).expect("deserialize touch");
        assert_eq!(event, PointerEvent::touch(400.0, 120.0));
    }
}
