//! SVG export through the external exporter.

use super::{ExportError, Target};
use crate::{
    config::ExporterConfig,
    debug,
    utils::{
        exec::{Cmd, ExecError, NPM_FILTER, Runner},
        path::move_file,
    },
};
use std::path::{Path, PathBuf};

/// Export `input` to SVG.
///
/// `output` defaults to the input with an `.svg` extension. The exporter
/// is run as `<command...> <input> <output>` and may ignore the requested
/// name, writing `<input>` with the configured suffix instead; that file is
/// moved onto `output`.
///
/// Success is decided by whether `output` exists afterwards, not by the
/// exporter's exit status.
pub fn export_svg(
    input: &Path,
    output: Option<&Path>,
    config: &ExporterConfig,
    runner: &dyn Runner,
) -> Result<PathBuf, ExportError> {
    if !input.exists() {
        return Err(ExportError::InputNotFound(input.to_path_buf()));
    }

    let output = output.map_or_else(|| Target::Svg.default_output(input), Path::to_path_buf);
    let produced = input.with_extension(&config.suffix);

    let cmd = Cmd::from_slice(&config.command)
        .arg(input)
        .arg(&output)
        .timeout(config.timeout())
        .filter(&NPM_FILTER);

    debug!("export"; "{} -> {}", input.display(), output.display());
    let result = runner.run(&cmd).map_err(|err| match err {
        ExecError::NotFound { program } => ExportError::MissingRuntime { program },
        ExecError::Timeout { after, .. } => ExportError::Timeout {
            secs: after.as_secs(),
        },
        other => ExportError::Exec(other),
    })?;

    if produced != output && produced.exists() {
        debug!("export"; "moving {} -> {}", produced.display(), output.display());
        move_file(&produced, &output).map_err(|source| ExportError::Move {
            from: produced.clone(),
            to: output.clone(),
            source,
        })?;
    }

    if output.exists() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&result.stderr);
        Err(ExportError::Failed(stderr.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::testing::{FakeRunner, arg, diagram, output, success, suffix_exporter};
    use std::{fs, time::Duration};
    use tempfile::TempDir;

    fn config() -> ExporterConfig {
        ExporterConfig::default()
    }

    #[test]
    fn test_missing_input_launches_nothing() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new().on("npx", suffix_exporter);
        let input = dir.path().join("missing.excalidraw");

        let err = export_svg(&input, None, &config(), &runner).unwrap_err();

        assert!(matches!(err, ExportError::InputNotFound(ref p) if *p == input));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_default_output_and_rename() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let runner = FakeRunner::new().on("npx", suffix_exporter);

        let path = export_svg(&input, None, &config(), &runner).unwrap();

        assert_eq!(path, dir.path().join("diagram.svg"));
        assert!(path.exists());
        assert!(!dir.path().join("diagram.excalidraw.svg").exists());
    }

    #[test]
    fn test_command_line() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let out = dir.path().join("out.svg");
        let runner = FakeRunner::new().on("npx", suffix_exporter);

        export_svg(&input, Some(&out), &config(), &runner).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            [
                "npx".to_string(),
                "excalidraw_export".to_string(),
                input.display().to_string(),
                out.display().to_string(),
            ]
        );
        assert!(out.exists());
    }

    #[test]
    fn test_exporter_runs_with_timeout() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let runner = FakeRunner::new().on("npx", |cmd| {
            assert_eq!(cmd.get_timeout(), Some(Duration::from_secs(60)));
            suffix_exporter(cmd)
        });

        export_svg(&input, None, &config(), &runner).unwrap();
    }

    #[test]
    fn test_exporter_honoring_requested_name() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let runner = FakeRunner::new().on("npx", |cmd| {
            fs::write(arg(cmd, 2), "<svg/>").unwrap();
            Ok(success())
        });

        let path = export_svg(&input, None, &config(), &runner).unwrap();
        assert_eq!(path, dir.path().join("diagram.svg"));
    }

    #[test]
    fn test_output_into_other_directory() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let out_dir = TempDir::new().unwrap();
        let out = out_dir.path().join("exported.svg");
        let runner = FakeRunner::new().on("npx", suffix_exporter);

        let path = export_svg(&input, Some(&out), &config(), &runner).unwrap();

        assert_eq!(path, out);
        assert!(out.exists());
    }

    #[test]
    fn test_timeout_is_not_success() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let runner = FakeRunner::new().on("npx", |cmd| {
            // partial output left behind before the kill
            fs::write(arg(cmd, 2), "<svg").unwrap();
            Err(ExecError::Timeout {
                program: "npx".into(),
                after: Duration::from_secs(60),
            })
        });

        let err = export_svg(&input, None, &config(), &runner).unwrap_err();
        assert!(matches!(err, ExportError::Timeout { secs: 60 }));
    }

    #[test]
    fn test_launcher_not_found() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let runner = FakeRunner::new();

        let err = export_svg(&input, None, &config(), &runner).unwrap_err();
        assert!(matches!(err, ExportError::MissingRuntime { ref program } if program == "npx"));
    }

    #[test]
    fn test_no_output_carries_stderr() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let runner =
            FakeRunner::new().on("npx", |_| Ok(output(1, "SyntaxError: Unexpected token\n")));

        let err = export_svg(&input, None, &config(), &runner).unwrap_err();
        assert!(
            matches!(err, ExportError::Failed(ref msg) if msg == "SyntaxError: Unexpected token")
        );
        assert!(err.to_string().starts_with("Export failed: "));
    }

    #[test]
    fn test_custom_command_and_suffix() {
        let dir = TempDir::new().unwrap();
        let input = diagram(dir.path());
        let config = ExporterConfig {
            command: vec!["bunx".into(), "excalidraw-cli".into(), "--svg".into()],
            timeout: 5,
            suffix: "out.svg".into(),
        };
        let runner = FakeRunner::new().on("bunx", |cmd| {
            assert_eq!(cmd.get_timeout(), Some(Duration::from_secs(5)));
            let input = arg(cmd, 2);
            fs::write(input.with_extension("out.svg"), "<svg/>").unwrap();
            Ok(success())
        });

        let path = export_svg(&input, None, &config, &runner).unwrap();
        assert_eq!(path, dir.path().join("diagram.svg"));
        assert!(!dir.path().join("diagram.out.svg").exists());
    }
}
