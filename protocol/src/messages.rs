use serde::{Deserialize, Serialize};

use crate::TextBoard;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    pub width: i32,
    pub height: i32,
    pub bomb_count: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameResponse {
    pub id: u64,
    pub board: TextBoard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveRequest {
    pub game_id: u64,
    pub x: i32,
    pub y: i32,
}

/// `result` is only present on the move that ends the game: `true` for a win.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeMoveResponse {
    pub board: TextBoard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfinishedGame {
    pub id: u64,
    pub board: TextBoard,
    pub moves_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Read-only view of a single game, finished or not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: u64,
    pub width: u8,
    pub height: u8,
    pub bomb_count: u16,
    pub board: TextBoard,
    pub moves_count: u32,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub average_moves: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_camel_case() {
        let request: NewGameRequest =
            serde_json::from_value(json!({"width": 9, "height": 8, "bombCount": 10})).unwrap();
        assert_eq!(request.bomb_count, 10);

        let request: MakeMoveRequest =
            serde_json::from_value(json!({"gameId": 3, "x": 1, "y": 2})).unwrap();
        assert_eq!(request.game_id, 3);
    }

    #[test]
    fn move_result_is_omitted_while_in_progress() {
        let in_progress = MakeMoveResponse {
            board: vec![vec!["1".to_string()]],
            result: None,
        };
        let lost = MakeMoveResponse {
            result: Some(false),
            ..in_progress.clone()
        };

        assert_eq!(serde_json::to_value(&in_progress).unwrap(), json!({"board": [["1"]]}));
        assert_eq!(
            serde_json::to_value(&lost).unwrap(),
            json!({"board": [["1"]], "result": false})
        );
    }

    #[test]
    fn unfinished_game_field_names() {
        let game = UnfinishedGame {
            id: 4,
            board: vec![vec![" ".to_string()]],
            moves_count: 2,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:01:00Z".to_string(),
        };

        let value = serde_json::to_value(&game).unwrap();

        assert_eq!(value["movesCount"], 2);
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(value["updatedAt"], "2024-01-01T00:01:00Z");
    }
}
