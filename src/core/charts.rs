//! Dashboard charts.
//!
//! Only drawn when the host page ships a charting library. The datasets are
//! fixed illustration data for the dashboard, not live figures.

use serde::Serialize;

pub const APPLICATIONS_CHART: &str = "applications-chart";
pub const SKILLS_CHART: &str = "skills-chart";

const PALETTE: [&str; 5] = ["#2563eb", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    pub background_color: Colors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub plugins: Plugins,
}

/// Chart.js-shaped configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartOptions {
    fn legend_at(position: &str) -> Self {
        Self {
            responsive: true,
            plugins: Plugins {
                legend: Legend {
                    position: position.to_string(),
                },
            },
        }
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn applications_chart() -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels: labels(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
            datasets: vec![Dataset {
                label: Some("Applications".to_string()),
                data: vec![12.0, 19.0, 3.0, 5.0, 2.0, 3.0],
                border_color: Some(PALETTE[0].to_string()),
                background_color: Colors::Single("rgba(37, 99, 235, 0.1)".to_string()),
                tension: Some(0.4),
            }],
        },
        options: ChartOptions::legend_at("top"),
    }
}

pub fn skills_chart() -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: labels(&["Python", "JavaScript", "React", "Django", "SQL"]),
            datasets: vec![Dataset {
                label: None,
                data: vec![30.0, 25.0, 20.0, 15.0, 10.0],
                border_color: None,
                background_color: Colors::Many(labels(&PALETTE)),
                tension: None,
            }],
        },
        options: ChartOptions::legend_at("bottom"),
    }
}

/// The page's charting library, when there is one.
#[cfg_attr(test, mockall::automock)]
pub trait ChartLibrary: Send + Sync {
    fn create(&self, mount_id: &str, config: &ChartConfig);
}

/// Draw the dashboard charts into whichever of the two mounts exist.
/// Returns the mounts that were drawn.
pub fn init_dashboard_charts(
    library: Option<&dyn ChartLibrary>,
    has_mount: impl Fn(&str) -> bool,
) -> Vec<&'static str> {
    let Some(library) = library else {
        return Vec::new();
    };

    let mut drawn = Vec::new();
    for (mount, config) in [
        (APPLICATIONS_CHART, applications_chart()),
        (SKILLS_CHART, skills_chart()),
    ] {
        if has_mount(mount) {
            library.create(mount, &config);
            drawn.push(mount);
        }
    }
    drawn
}
