//! 3D replay of a run using kiss3d.
//!
//! The viewer records every snapshot it is sent while the game is played and
//! opens a window only once the run has ended, so checking and playing never
//! wait on rendering.

use kiss3d::prelude::*;

use blockfall::field::{FIELD_HEIGHT, FIELD_WIDTH};
use blockfall::{Candidate, Field, Observer, Stats};

/// Snapshots skipped by one Up/Down key press.
const JUMP: usize = 10;

/// Display color for a piece id (1-10), or the floor (0).
fn piece_color(id: u8, ghost: bool) -> Color {
    const PALETTE: [(u8, u8, u8); 11] = [
        (32, 32, 32),
        (0, 255, 204),
        (255, 128, 178),
        (255, 102, 0),
        (255, 212, 42),
        (44, 160, 90),
        (215, 238, 244),
        (160, 44, 44),
        (205, 135, 222),
        (42, 212, 255),
        (204, 255, 0),
    ];
    let (r, g, b) = PALETTE[usize::from(id) % PALETTE.len()];
    let scale = if ghost { 3.0 * 255.0 } else { 255.0 };
    Color::new(
        f32::from(r) / scale,
        f32::from(g) / scale,
        f32::from(b) / scale,
        1.0,
    )
}

/// An occupied cell: column, row and piece id.
type Cell = (usize, usize, u8);

struct Snapshot {
    cells: Vec<Cell>,
    /// Cells of the form about to be dropped, at its landing position.
    ghost: Vec<Cell>,
    pos: usize,
    score: i64,
}

impl Snapshot {
    fn capture(field: &Field, stats: &Stats, candidate: Option<Candidate<'_>>) -> Self {
        let mut cells = Vec::new();
        for x in 0..FIELD_WIDTH {
            for y in 0..field.top(x) {
                if field.is_filled(x, y) {
                    cells.push((x, y, field.tile(x, y)));
                }
            }
        }

        let ghost = candidate
            .map(|Candidate { form, xpos }| {
                let rest = field.rest_row(form, xpos);
                form.cells()
                    .map(|(x, y)| (xpos + x, rest + y, form.id()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            cells,
            ghost,
            pos: stats.pos,
            score: stats.final_score(),
        }
    }
}

/// Observer that replays recorded snapshots in a window.
#[derive(Default)]
pub struct Viewer {
    snapshots: Vec<Snapshot>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for Viewer {
    fn update(&mut self, field: &Field, stats: &Stats, candidate: Option<Candidate<'_>>) {
        self.snapshots.push(Snapshot::capture(field, stats, candidate));
    }

    fn wait(&mut self) {
        if self.snapshots.is_empty() {
            log::info!("nothing to replay");
            return;
        }
        println!("Controls: Left/Right step, Up/Down jump, R restart");
        pollster::block_on(display_async(&self.snapshots));
    }
}

/// Adds the walls and floor around the field.
fn build_frame(scene: &mut SceneNode3d) {
    let height = FIELD_HEIGHT as f32;
    let width = FIELD_WIDTH as f32;
    for x in [-1.0, width] {
        scene
            .add_cube(0.9, height + 1.0, 0.9)
            .set_color(piece_color(0, false))
            .set_position(cell_position(x, height / 2.0 - 1.0));
    }
    scene
        .add_cube(width, 0.9, 0.9)
        .set_color(piece_color(0, false))
        .set_position(cell_position(width / 2.0 - 0.5, -1.0));
}

/// Maps field coordinates to world units, centred on the origin.
fn cell_position(x: f32, y: f32) -> Vec3 {
    Vec3::new(
        x - (FIELD_WIDTH as f32 - 1.0) / 2.0,
        y - (FIELD_HEIGHT as f32 - 1.0) / 2.0,
        0.0,
    )
}

fn build_snapshot(scene: &mut SceneNode3d, snapshot: &Snapshot) -> Vec<SceneNode3d> {
    const CUBE_SIZE: f32 = 0.9;

    let solid = snapshot.cells.iter().map(|cell| (cell, false));
    let ghost = snapshot.ghost.iter().map(|cell| (cell, true));
    solid
        .chain(ghost)
        .map(|(&(x, y, id), ghost)| {
            scene
                .add_cube(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE)
                .set_color(piece_color(id, ghost))
                .set_position(cell_position(x as f32, y as f32))
        })
        .collect()
}

fn title(snapshots: &[Snapshot], index: usize) -> String {
    let snapshot = &snapshots[index];
    format!(
        "Step {}/{} - piece {}, score {} - [Left/Right] step, [Up/Down] jump, [R] restart",
        index + 1,
        snapshots.len(),
        snapshot.pos,
        snapshot.score
    )
}

async fn display_async(snapshots: &[Snapshot]) {
    let last = snapshots.len() - 1;
    let mut index = last;

    let mut window = Window::new(&title(snapshots, index)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(60.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(0.0, 30.0, 40.0));
    build_frame(&mut scene);

    let mut nodes = build_snapshot(&mut scene, &snapshots[index]);
    let mut needs_rebuild = false;

    loop {
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    let target = match key {
                        Key::Right => (index + 1).min(last),
                        Key::Left => index.saturating_sub(1),
                        Key::Up => (index + JUMP).min(last),
                        Key::Down => index.saturating_sub(JUMP),
                        Key::R => 0,
                        _ => index,
                    };
                    if target != index {
                        index = target;
                        needs_rebuild = true;
                    }
                }
            }
        }

        if needs_rebuild {
            for mut node in nodes.drain(..) {
                node.remove();
            }
            nodes = build_snapshot(&mut scene, &snapshots[index]);
            window.set_title(&title(snapshots, index));
            needs_rebuild = false;
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
