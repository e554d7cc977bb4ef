use jest_runner_core::{Invocation, RunState, SourceLocation};
use std::path::Path;

/// Locations resolved against `dir`, one `file:line:column` per line.
pub fn format_locations(locations: &[SourceLocation], dir: &Path) -> String {
    locations
        .iter()
        .map(|loc| loc.resolve(dir).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_invocation(invocation: &Invocation) {
    println!("{}", invocation.command);
    println!("Working directory: {}", invocation.working_dir.display());
}

pub fn print_run_state(state: RunState) {
    match state {
        RunState::Succeeded => eprintln!("✅ Tests passed"),
        RunState::Failed { code: Some(code) } => eprintln!("❌ Runner exited with code {code}"),
        RunState::Failed { code: None } => eprintln!("❌ Runner was terminated by a signal"),
        RunState::Cancelled => eprintln!("⏹️  Run cancelled"),
        RunState::Idle | RunState::Running => {}
    }
}

/// Summary printed after a run so the locations are easy to jump to.
pub fn print_locations_summary(locations: &[SourceLocation], dir: &Path) {
    if locations.is_empty() {
        return;
    }

    // Frames inside node_modules are rarely where the fix goes
    let own: Vec<SourceLocation> = locations
        .iter()
        .filter(|loc| {
            !loc.file
                .components()
                .any(|c| c.as_os_str() == "node_modules")
        })
        .cloned()
        .collect();
    let shown = if own.is_empty() { locations } else { &own[..] };

    eprintln!();
    eprintln!("📍 Locations ({}):", shown.len());
    for line in format_locations(shown, dir).lines() {
        eprintln!("   {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_locations_resolves_relative_paths() {
        let locations = vec![
            SourceLocation::new("src/sum.test.js", 4, 17),
            SourceLocation::new("/abs/other.js", 1, 1),
        ];
        assert_eq!(
            format_locations(&locations, Path::new("/work/app")),
            "/work/app/src/sum.test.js:4:17\n/abs/other.js:1:1"
        );
    }

    #[test]
    fn test_format_locations_empty() {
        assert_eq!(format_locations(&[], Path::new("/work")), "");
    }
}
