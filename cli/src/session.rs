//! Console session: the onboarding dialogue and the screens it opens.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::task::JoinHandle;

use clara_api::{ApiClient, spawn_geofence_report};
use clara_config::ResolvedConfig;
use clara_core::{
    AssistantChat, DEFAULT_CONTACTS, Dialogue, FamilyLayout, FamilyTree, GeofenceMonitor,
    Platform, Screen, Transition,
};
use clara_types::{GeofenceReport, PersonName, RelationSet};

use crate::location::{SampleFilter, parse_sample};

pub const LOCATION_DENIED: &str = "Permission to access location was denied";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn is_quit(line: &str) -> bool {
    matches!(line, "quit" | "exit" | "q")
}

fn is_done(line: &str) -> bool {
    line.is_empty() || matches!(line, "done" | "back")
}

pub struct Session<R, W> {
    lines: Lines<R>,
    out: W,
    config: ResolvedConfig,
    client: ApiClient,
    family: FamilyTree,
    reports: Vec<JoinHandle<()>>,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W, config: ResolvedConfig, client: ApiClient) -> Self {
        let family = FamilyTree::seeded(config.relation_policy);
        Self {
            lines: input.lines(),
            out,
            config,
            client,
            family,
            reports: Vec::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        match self.client.greeting().await {
            Ok(message) => writeln!(self.out, "{message}")?,
            Err(e) => tracing::error!("Error fetching data: {e}"),
        }

        let mut dialogue = Dialogue::new();
        loop {
            let prompt = match dialogue.active_prompt() {
                Some(id) => id,
                None => dialogue.resume(),
            };
            let Some(message) = dialogue.transcript().get(prompt) else {
                break;
            };
            writeln!(self.out, "\nClara: {}", message.text)?;
            for (n, option) in message.options.iter().enumerate() {
                writeln!(self.out, "  {}. {}", n + 1, option.text)?;
            }
            let option_id = {
                let Some(line) = self.read_line("> ").await? else {
                    break;
                };
                if is_quit(&line) {
                    break;
                }
                match line.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= message.options.len() => {
                        message.options[n - 1].id.to_string()
                    }
                    _ => line,
                }
            };

            match dialogue.select(prompt, &option_id) {
                Ok(Transition::Reply(_)) => {}
                Ok(Transition::Navigate(screen)) => {
                    if self.open(screen).await? == Flow::Quit {
                        break;
                    }
                    dialogue.resume();
                }
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }

        self.flush_reports().await;
        Ok(())
    }

    /// Waits for geofence reports still in flight.
    pub async fn flush_reports(&mut self) {
        for handle in self.reports.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("Geofence report task failed: {e}");
            }
        }
    }

    fn track_report(&mut self, handle: JoinHandle<()>) {
        self.reports.retain(|h| !h.is_finished());
        self.reports.push(handle);
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    async fn open(&mut self, screen: Screen) -> Result<Flow> {
        tracing::info!(?screen, "Opening screen");
        match screen {
            Screen::Login => {
                writeln!(self.out, "Caregiver sign-in is not available in this build.")?;
                Ok(Flow::Continue)
            }
            Screen::Geofence => self.geofence_screen().await,
            Screen::Family => self.family_screen().await,
            Screen::Contacts => {
                self.contacts_screen()?;
                Ok(Flow::Continue)
            }
            Screen::Assistant => self.assistant_screen().await,
        }
    }

    async fn geofence_screen(&mut self) -> Result<Flow> {
        let settings = self.config.location;
        if !settings.enabled {
            writeln!(self.out, "{LOCATION_DENIED}")?;
            return Ok(Flow::Continue);
        }

        let mut monitor = GeofenceMonitor::new(self.config.geofence, self.config.report_policy);
        if !self.config.dedupe {
            monitor = monitor.without_dedupe();
        }
        let mut filter = SampleFilter::new(settings);
        tracing::debug!(policy = ?monitor.policy(), "Geofence screen opened");

        let fence = monitor.fence();

        writeln!(
            self.out,
            "Geofence: {} radius {} m ({} accuracy)",
            fence.center(),
            fence.radius_meters(),
            settings.accuracy
        )?;
        writeln!(self.out, "Checking location...")?;

        loop {
            let Some(line) = self.read_line("location (lat,lon)> ").await? else {
                return Ok(Flow::Quit);
            };
            if is_quit(&line) {
                return Ok(Flow::Quit);
            }
            if is_done(&line) {
                return Ok(Flow::Continue);
            }

            let point = match parse_sample(&line) {
                Ok(point) => point,
                Err(e) => {
                    writeln!(self.out, "{e}")?;
                    continue;
                }
            };
            if !filter.admits(point) {
                tracing::debug!(%point, "Sample below distance interval");
                continue;
            }
            let hold = filter.hold_for(Instant::now());
            if !hold.is_zero() {
                tokio::time::sleep(hold).await;
            }
            filter.delivered(point, Instant::now());

            let Some(observation) = monitor.observe(point) else {
                continue;
            };
            writeln!(
                self.out,
                "{} ({:.0} m from center)",
                observation.status, observation.distance_meters
            )?;
            if observation.should_report {
                let report = GeofenceReport::new(observation.status, observation.point);
                self.track_report(spawn_geofence_report(self.client.clone(), report));
            }
        }
    }

    async fn family_screen(&mut self) -> Result<Flow> {
        writeln!(self.out, "My Family Tree")?;
        writeln!(self.out, "{}", render_layout(&FamilyLayout::compute(&self.family)))?;
        writeln!(self.out, "Commands: add <name>, list, tree, done")?;

        loop {
            let Some(line) = self.read_line("family> ").await? else {
                return Ok(Flow::Quit);
            };
            if is_quit(&line) {
                return Ok(Flow::Quit);
            }
            if is_done(&line) {
                return Ok(Flow::Continue);
            }

            if line == "list" {
                for person in self.family.iter() {
                    let relations: Vec<&str> =
                        person.relations.iter().map(PersonName::as_str).collect();
                    writeln!(self.out, "  {} <- [{}]", person.name, relations.join(", "))?;
                }
            } else if line == "tree" {
                writeln!(self.out, "{}", render_layout(&FamilyLayout::compute(&self.family)))?;
            } else if let Some(raw) = line
                .strip_prefix("add ")
                .or_else(|| (line == "add").then_some(""))
            {
                // Blank names are ignored without feedback.
                let Ok(name) = PersonName::new(raw.trim()) else {
                    continue;
                };
                if self.add_member(name).await? == Flow::Quit {
                    return Ok(Flow::Quit);
                }
            } else {
                writeln!(self.out, "Unknown command: {line}")?;
            }
        }
    }

    async fn add_member(&mut self, name: PersonName) -> Result<Flow> {
        let choices: Vec<String> = self
            .family
            .list_members()
            .into_iter()
            .map(str::to_string)
            .collect();
        writeln!(self.out, "Who is {name} connected to?")?;
        for (n, member) in choices.iter().enumerate() {
            writeln!(self.out, "  {}. {member}", n + 1)?;
        }

        let Some(line) = self.read_line("connections (comma separated, blank for none)> ").await?
        else {
            return Ok(Flow::Quit);
        };
        let mut relations = RelationSet::new();
        for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let resolved = match token.parse::<usize>() {
                Ok(n) if n >= 1 && n <= choices.len() => choices[n - 1].as_str(),
                _ => token,
            };
            if let Ok(relation) = PersonName::new(resolved) {
                relations.toggle(relation);
            }
        }

        match self.family.add_person(name.clone(), relations) {
            Ok(()) => writeln!(self.out, "Added {name}.")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(Flow::Continue)
    }

    fn contacts_screen(&mut self) -> Result<()> {
        let platform = Platform::current();
        writeln!(self.out, "Emergency Contacts")?;
        for contact in DEFAULT_CONTACTS {
            writeln!(
                self.out,
                "  {:<18} {:<14} {}",
                contact.name,
                contact.phone,
                contact.dial_uri(platform)
            )?;
        }
        Ok(())
    }

    async fn assistant_screen(&mut self) -> Result<Flow> {
        let mut chat = AssistantChat::new(self.config.user_id.clone());
        if let Some(greeting) = chat.transcript().last() {
            writeln!(self.out, "Clara: {}", greeting.text)?;
        }

        loop {
            let Some(line) = self.read_line("you> ").await? else {
                return Ok(Flow::Quit);
            };
            if is_quit(&line) {
                return Ok(Flow::Quit);
            }
            if line == "done" || line == "back" {
                return Ok(Flow::Continue);
            }
            let Some(request) = chat.begin(&line) else {
                continue;
            };
            let outcome = self.client.chat(&request).await;
            let reply = chat.complete(outcome);
            if let Some(message) = chat.transcript().get(reply) {
                writeln!(self.out, "Clara: {}", message.text)?;
            }
        }
    }
}

/// Text rendering of the layout: one line per row, left to right.
pub fn render_layout(layout: &FamilyLayout) -> String {
    let mut rows: BTreeMap<u64, Vec<(f64, String)>> = BTreeMap::new();
    for node in &layout.nodes {
        let label = if node.highlighted {
            format!("[{}]", node.label)
        } else {
            node.label.clone()
        };
        rows.entry(node.y.round() as u64)
            .or_default()
            .push((node.x_percent, label));
    }

    rows.into_values()
        .map(|mut row| {
            row.sort_by(|a, b| a.0.total_cmp(&b.0));
            row.into_iter()
                .map(|(_, label)| label)
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
