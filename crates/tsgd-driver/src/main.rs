use clap::{Parser, Subcommand};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tsgd_codegen::{compile, CompileTarget};
use tsgd_driver::report::{render, report_all, report_steps};
use tsgd_driver::{watch, ProjectModel};
use tsgd_typeck::Analyzer;

#[derive(Parser)]
#[command(
    name = "tsgd",
    version,
    about = "TypeScript to GDScript compiler for Godot projects",
    long_about = "Compiles the TypeScript scripts of a Godot project to GDScript and keeps\ntype declarations for its scenes and assets up to date."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every declaration and script once
    Build {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Build, then rebuild whatever changes on disk
    Watch {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Write scene and asset declarations only
    Defs {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Print the GDScript for a single file (debug)
    Transpile {
        /// Input TypeScript file
        input: PathBuf,

        /// `res://` path the output would be written to
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { root } => build_command(&root),
        Commands::Watch { root } => watch_command(&root),
        Commands::Defs { root } => defs_command(&root),
        Commands::Transpile { input, output } => transpile_command(&input, output),
    }
}

fn open_project(root: &Path) -> Option<ProjectModel> {
    match ProjectModel::open(root) {
        Ok(model) => Some(model),
        Err(open_error) => {
            error!("{}", open_error);
            None
        }
    }
}

fn build_command(root: &Path) -> ExitCode {
    let Some(mut model) = open_project(root) else {
        return ExitCode::FAILURE;
    };
    if let Err(scan_error) = model.scan() {
        error!("{}", scan_error);
        return ExitCode::FAILURE;
    }

    let errors = report_all(&model);
    let scripts = model.scripts().count();
    if errors > 0 {
        error!("{} error(s) in {} script(s)", errors, scripts);
        ExitCode::FAILURE
    } else {
        info!("built {} script(s)", scripts);
        ExitCode::SUCCESS
    }
}

fn watch_command(root: &Path) -> ExitCode {
    let Some(mut model) = open_project(root) else {
        return ExitCode::FAILURE;
    };
    if let Err(scan_error) = model.scan() {
        error!("{}", scan_error);
        return ExitCode::FAILURE;
    }
    report_all(&model);
    model.clear_log();

    let result = watch::run(&mut model, |model, steps| {
        for step in steps {
            info!("{}", step);
        }
        report_steps(model, steps);
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(watch_error) => {
            error!("{}", watch_error);
            ExitCode::FAILURE
        }
    }
}

fn defs_command(root: &Path) -> ExitCode {
    let Some(mut model) = open_project(root) else {
        return ExitCode::FAILURE;
    };
    model.discover();
    model.build_definitions();

    let scenes = model.synthesis().scenes.len();
    let errors = report_all(&model);
    info!("wrote declarations for {} scene(s)", scenes);
    if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn transpile_command(input: &Path, output: Option<String>) -> ExitCode {
    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(read_error) => {
            error!("cannot read {}: {}", input.display(), read_error);
            return ExitCode::FAILURE;
        }
    };

    let file = input.display().to_string();
    let output_res_path = output.unwrap_or_else(|| {
        let stem = input.file_stem().and_then(|stem| stem.to_str()).unwrap_or("script");
        format!("res://{}.gd", stem)
    });

    let mut analyzer = Analyzer::new();
    analyzer.set_source(&file, &source);
    analyzer.check(&file);
    let unit = compile(
        &CompileTarget {
            file: file.clone(),
            output_res_path,
        },
        &analyzer,
    );

    for diagnostic in &unit.diagnostics {
        render(&file, Some(&source), diagnostic);
    }
    if unit.has_errors() {
        return ExitCode::FAILURE;
    }

    print!("{}", unit.text);
    for aux in &unit.aux_files {
        println!();
        println!("# --- {} ---", aux.name);
        print!("{}", aux.content);
    }
    ExitCode::SUCCESS
}
