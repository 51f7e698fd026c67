//! Shared fixtures for the TUI integration tests

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dockhand_config::Settings;
use dockhand_runtime::normalize::group_projects;
use dockhand_runtime::{
    ComposeAssociation, ComposeProject, Container, ContainerState, ResourceUsage, RuntimeKind,
};
use dockhand_tui::ui::Theme;
use dockhand_tui::{App, Command, Message};
use ratatui::{backend::TestBackend, Terminal};
use std::collections::BTreeMap;

pub const WIDTH: u16 = 200;
pub const HEIGHT: u16 = 40;

/// A container with the state derived from `status`
#[allow(dead_code)]
pub fn container(id: &str, name: &str, status: &str) -> Container {
    Container {
        id: id.to_string(),
        names: vec![name.to_string()],
        image: format!("{}:latest", name),
        status: status.to_string(),
        state: ContainerState::from_status(status),
        usage: None,
        ports: String::new(),
        compose: None,
    }
}

#[allow(dead_code)]
pub fn running(id: &str, name: &str) -> Container {
    let mut c = container(id, name, "Up 5 minutes");
    c.usage = Some(ResourceUsage {
        cpu: "1.00%".to_string(),
        memory: "2.00%".to_string(),
        net_io: "1kB / 1kB".to_string(),
        block_io: "0B / 0B".to_string(),
    });
    c
}

#[allow(dead_code)]
pub fn stopped(id: &str, name: &str) -> Container {
    container(id, name, "Exited (0) 2 hours ago")
}

#[allow(dead_code)]
pub fn in_project(mut c: Container, project: &str) -> Container {
    c.compose = Some(ComposeAssociation {
        project: project.to_string(),
        service: c.name().to_string(),
        container_number: "1".to_string(),
        config_files: format!("/srv/{}/compose.yml", project),
        working_dir: format!("/srv/{}", project),
    });
    c
}

/// Project "web" holding a (running) and b (stopped), plus standalone c
#[allow(dead_code)]
pub fn compose_fixture() -> Vec<Container> {
    vec![
        in_project(running("a", "web-a"), "web"),
        in_project(stopped("b", "web-b"), "web"),
        running("c", "tool"),
    ]
}

#[allow(dead_code)]
pub fn projects_of(containers: &[Container]) -> BTreeMap<String, ComposeProject> {
    group_projects(containers.to_vec())
}

#[allow(dead_code)]
pub fn new_app() -> App {
    App::new(Settings::default(), RuntimeKind::Docker, WIDTH, HEIGHT)
}

/// App with a container listing already applied
#[allow(dead_code)]
pub fn loaded_app(containers: Vec<Container>) -> App {
    let mut app = new_app();
    app.update(Message::ContainersLoaded(Ok(containers)));
    app
}

/// App in compose view with both listings applied
#[allow(dead_code)]
pub fn compose_app(containers: Vec<Container>) -> App {
    let projects = projects_of(&containers);
    let mut app = loaded_app(containers);
    press(&mut app, KeyCode::Char('c'));
    app.update(Message::ComposeProjectsLoaded(Ok(projects)));
    app
}

#[allow(dead_code)]
pub fn press(app: &mut App, code: KeyCode) -> Vec<Command> {
    press_with(app, code, KeyModifiers::NONE)
}

#[allow(dead_code)]
pub fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
    app.update(Message::Key(KeyEvent::new(code, modifiers)))
}

/// Deliver a tick from the live timer chain
#[allow(dead_code)]
pub fn tick(app: &mut App) -> Vec<Command> {
    let generation = app.tick_generation;
    app.update(Message::Tick(generation))
}

/// The reschedule command a live tick issues at `secs`
#[allow(dead_code)]
pub fn tick_every(secs: u64, generation: u64) -> Command {
    Command::Tick {
        interval: std::time::Duration::from_secs(secs),
        generation,
    }
}

#[allow(dead_code)]
pub fn notice(app: &App) -> Option<&str> {
    app.status.as_ref().map(|s| s.text.as_str())
}

/// Render the app to a TestBackend and capture output as a string
#[allow(dead_code)]
pub fn render_app(app: &App) -> String {
    let backend = TestBackend::new(app.width, app.height);
    let mut terminal = Terminal::new(backend).unwrap();
    let theme = Theme::default();
    terminal
        .draw(|frame| dockhand_tui::ui::draw(frame, app, &theme))
        .unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer_to_string(&buffer)
}

/// Convert a ratatui buffer to a string representation
#[allow(dead_code)]
pub fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let mut output = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            let cell = buffer.get(x, y);
            output.push_str(cell.symbol());
        }
        output.push('\n');
    }
    output
}
