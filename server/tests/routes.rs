use minesweeper_common::models::{CreateResponse, GameParams, GameState};
use minesweeper_engine::SavedField;
use minesweeper_server::{build, config::ServerConfig};
use rocket::{http::Status, local::blocking::Client};

fn client() -> Client {
    Client::tracked(build(ServerConfig::default())).expect("valid rocket instance")
}

fn create(client: &Client, params: GameParams) -> String {
    let response = client.post("/create").json(&params).dispatch();
    assert_eq!(response.status(), Status::Ok);
    response
        .into_json::<CreateResponse>()
        .expect("create response")
        .id
}

fn save(client: &Client, id: &str) -> SavedField {
    let response = client.get(format!("/games/{id}/save")).dispatch();
    assert_eq!(response.status(), Status::Ok);
    response.into_json().expect("saved field")
}

#[test]
fn create_returns_a_fresh_game() {
    let client = client();
    let id = create(
        &client,
        GameParams {
            cols: 8,
            rows: 6,
            mines: 7,
        },
    );
    assert!(id.len() >= 5);

    let saved = save(&client, &id);
    assert_eq!(saved.field_size, [8, 6]);
    assert_eq!(saved.mines, 7);
    assert_eq!(saved.mine_map.iter().filter(|&&mine| mine).count(), 7);
    assert_eq!(saved.cells_to_open, 41);
    assert_eq!(saved.game_state, GameState::Playing);
    assert!(saved.is_first_click);
    assert!(saved.reveal_worklist.is_empty());
}

#[test]
fn saved_field_loads_into_another_game() {
    let client = client();
    let source = create(&client, GameParams::default());
    let target = create(
        &client,
        GameParams {
            cols: 20,
            rows: 3,
            mines: 1,
        },
    );

    let snapshot = save(&client, &source);
    let response = client
        .post(format!("/games/{target}/load"))
        .json(&snapshot)
        .dispatch();
    assert_eq!(response.status(), Status::NoContent);

    assert_eq!(save(&client, &target), snapshot);
}

#[test]
fn inconsistent_snapshot_is_rejected() {
    let client = client();
    let id = create(&client, GameParams::default());
    let original = save(&client, &id);

    let mut broken = original.clone();
    broken.cell_state.truncate(10);
    let response = client
        .post(format!("/games/{id}/load"))
        .json(&broken)
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    assert_eq!(save(&client, &id), original);
}

#[test]
fn unknown_games_are_not_found() {
    let client = client();
    assert_eq!(
        client.get("/games/nope/save").dispatch().status(),
        Status::NotFound
    );

    let snapshot = save(&client, &create(&client, GameParams::default()));
    let response = client.post("/games/nope/load").json(&snapshot).dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn snapshots_with_mismatched_counters_are_rejected() {
    let client = client();
    let id = create(&client, GameParams::default());
    let original = save(&client, &id);

    let mut zero_sized = original.clone();
    zero_sized.field_size = [0, 9];
    zero_sized.mine_map.clear();
    zero_sized.cell_state.clear();

    let mut wrong_closed = original.clone();
    wrong_closed.closed_cells_count = 0;

    let mut finished_but_busy = original.clone();
    finished_but_busy.game_state = GameState::Win;
    finished_but_busy.reveal_worklist = vec![
        original
            .mine_map
            .iter()
            .position(|&mine| !mine)
            .expect("a free cell"),
    ];

    for broken in [zero_sized, wrong_closed, finished_but_busy] {
        let response = client
            .post(format!("/games/{id}/load"))
            .json(&broken)
            .dispatch();
        assert_eq!(response.status(), Status::UnprocessableEntity);
    }

    assert_eq!(save(&client, &id), original);
}
