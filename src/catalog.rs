//! Production-line and supervisor catalog backing the grid's
//! line/supervisor reconciliation rule: picking a line auto-selects its
//! default supervisor when the current one doesn't belong to it, and picking
//! a supervisor auto-fills that supervisor's line.

#[derive(Debug, Clone)]
pub struct Supervisor {
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct ProductionLine {
    pub name: String,
    pub supervisors: Vec<Supervisor>,
}

#[derive(Debug, Clone)]
pub struct LineCatalog {
    lines: Vec<ProductionLine>,
}

impl LineCatalog {
    pub fn new(lines: Vec<ProductionLine>) -> Self {
        Self { lines }
    }

    /// Plant catalog as shipped; a backend-driven catalog replaces this in
    /// deployments with a lines endpoint.
    pub fn standard() -> Self {
        let line = |name: &str, sups: &[(&str, bool)]| ProductionLine {
            name: name.to_string(),
            supervisors: sups
                .iter()
                .map(|(n, d)| Supervisor {
                    name: (*n).to_string(),
                    is_default: *d,
                })
                .collect(),
        };
        Self::new(vec![
            line("Linea 1", &[("C. Soto", true), ("M. Reyes", false)]),
            line("Linea 2", &[("P. Fuentes", true)]),
            line("Linea 3", &[("A. Vidal", false), ("R. Campos", true)]),
            line("Envasado", &[("L. Herrera", true)]),
        ])
    }

    pub fn lines(&self) -> &[ProductionLine] {
        &self.lines
    }

    pub fn line(&self, name: &str) -> Option<&ProductionLine> {
        self.lines.iter().find(|l| l.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn line_of_supervisor(&self, supervisor: &str) -> Option<&ProductionLine> {
        self.lines.iter().find(|l| {
            l.supervisors
                .iter()
                .any(|s| s.name.eq_ignore_ascii_case(supervisor.trim()))
        })
    }

    pub fn default_supervisor(&self, line: &str) -> Option<&Supervisor> {
        self.line(line)?.supervisors.iter().find(|s| s.is_default)
    }

    pub fn supervisor_belongs(&self, line: &str, supervisor: &str) -> bool {
        self.line(line)
            .map(|l| {
                l.supervisors
                    .iter()
                    .any(|s| s.name.eq_ignore_ascii_case(supervisor.trim()))
            })
            .unwrap_or(false)
    }
}
