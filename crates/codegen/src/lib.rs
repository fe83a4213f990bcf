//! Build-time generation of AI service implementations.
//!
//! The pipeline indexes a crate's sources, finds the traits that describe
//! AI services, computes a [`MethodDescriptor`](aicore::MethodDescriptor)
//! for every method and writes an implementation type per trait that
//! forwards each call to the runtime.
//!
//! Services are found three ways: by their use in `AiServices` factory
//! calls, by message annotations on their methods, and by
//! `#[register_ai_service]`. Registered services additionally get a
//! service context bean in the [`BeanManifest`].

pub use {
    build::{Build, MANIFEST_FILE},
    config::{Capabilities, CodegenConfig, TransparentAnnotations},
    error::{ConfigError, Error, Result},
    extract::Extractor,
    index::{TypeIndex, TypeKind},
    output::format_instructions,
    pipeline::{
        BEANS_FILE, BeanManifest, Generated, METADATA_FILE, Processor, Reflective, SOURCE_FILE,
    },
    registry::{BeanPlan, DeclarativeService, Registry, find_declarative_services, plan_beans},
    scan::{Candidate, Discovery, ScanReport, scan},
    synth::{ClassSpec, HEADER, Synthesizer},
};

mod build;
mod config;
mod error;
mod extract;
pub mod index;
pub mod names;
mod output;
mod pipeline;
mod registry;
mod scan;
mod synth;
pub mod usage;
