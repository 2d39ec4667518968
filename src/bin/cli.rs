// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runtime Mesh CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use runtime_mesh::collision::CollisionShapes;
use runtime_mesh::proxy::RecordingProxy;
use runtime_mesh::{MeshArchive, MeshConfig, ParryPhysics, RuntimeMesh};
use std::path::Path;

#[derive(Parser)]
#[command(name = "runtime-mesh")]
#[command(about = "Inspect and migrate runtime mesh archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sections, bounds and collision of an archive
    Inspect {
        /// Archive file
        input: String,

        /// Cook collision with parry3d and report the shapes
        #[arg(long)]
        cook: bool,
    },

    /// Re-save an archive at the latest format version
    Migrate {
        /// Archive file
        input: String,

        /// Output file
        #[arg(short, long)]
        output: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Inspect { input, cook } => inspect_command(input, *cook)?,
        Commands::Migrate { input, output } => migrate_command(input, output, cli.verbose)?,
        Commands::Version => {
            println!(
                "Runtime Mesh v{} (archive format {})",
                env!("CARGO_PKG_VERSION"),
                MeshArchive::LATEST
            );
        }
    }

    Ok(())
}

fn inspect_command(input: &str, cook: bool) -> Result<()> {
    if !Path::new(input).exists() {
        eprintln!("{} Input file not found: {}", "Error:".red().bold(), input);
        std::process::exit(1);
    }

    let (archive, source_version) = MeshArchive::load_with_version(input)?;
    let config = MeshConfig::load()?;
    let mut mesh = RuntimeMesh::with_config(config, RecordingProxy::new(), ParryPhysics::new());
    archive
        .restore(&mut mesh)
        .with_context(|| format!("Failed to restore archive: {}", input))?;

    println!("{} {}", "Archive:".bold(), input);
    println!("  Format version: {}", source_version);
    println!("  Section slots:  {}", mesh.section_count());
    println!();

    println!(
        "  {:>5}  {:<12} {:>9} {:>9} {:>10}  {:<10} {}",
        "index", "format", "vertices", "triangles", "bytes", "frequency", "flags"
    );
    for (index, section) in mesh.sections() {
        let flags = [
            (section.visible, "visible"),
            (section.casts_shadow, "shadow"),
            (section.collision_enabled, "collision"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(",");

        println!(
            "  {:>5}  {:<12} {:>9} {:>9} {:>10}  {:<10} {}",
            index,
            format!("{:?}", section.format()),
            section.vertex_count(),
            section.triangle_count(),
            section.vertices().packed_size() + section.indices().len() * 4,
            format!("{:?}", section.update_frequency),
            flags
        );
    }
    println!();

    let bounds = mesh.bounds();
    println!(
        "  Bounds: [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );

    let complex_triangles = mesh.collision_mesh().map_or(0, |m| m.triangle_count());
    println!(
        "  Collision: {} complex triangles, {} collision sections, {} convex hulls, complex-as-simple {}",
        complex_triangles,
        mesh.collision_sections().count(),
        mesh.convex_hulls().len(),
        mesh.use_complex_as_simple_collision()
    );

    if cook {
        mesh.rebuild_collision_if_dirty()?;
        match mesh.collision_body() {
            Some(shapes) => report_shapes(shapes),
            None => println!("  {}", "No collision cooked".yellow()),
        }
    }

    println!("{}", "✓ Archive is valid".green());
    Ok(())
}

fn report_shapes(shapes: &CollisionShapes) {
    let complex = if shapes.complex.is_some() { "trimesh" } else { "none" };
    let simple = match shapes.simple.as_ref().map(|s| s.as_compound()) {
        None => "none".to_string(),
        Some(Some(compound)) => format!("compound of {} hulls", compound.shapes().len()),
        Some(None) => "complex mesh".to_string(),
    };
    println!("  Cooked: complex {}, simple {}", complex, simple);
}

fn migrate_command(input: &str, output: &str, verbose: bool) -> Result<()> {
    let (archive, source_version) = MeshArchive::load_with_version(input)?;
    if verbose {
        println!(
            "Read {} (format {}, {} sections)",
            input,
            source_version,
            archive.sections.len()
        );
    }

    archive.save(output)?;
    println!(
        "{} {} -> {} (format {})",
        "Migrated".green().bold(),
        input,
        output,
        MeshArchive::LATEST
    );
    Ok(())
}
