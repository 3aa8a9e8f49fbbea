//! A crate for translating and simulating programs for a small 32-bit accumulator machine with
//! interrupt driven input.
//!
//! Currently this crate provides the functionality to:
//! - Translate assembly source into a code image ([compiler]).
//! - Read and write code images in their textual form ([image]).
//! - Execute code images tick by tick on a model of the datapath and control unit ([machine]).
//! - Drive whole runs with timed input events and collect the output, counters and a trace
//!   ([simulation]).
//!
//! # Example
//! ```
//! use acc32::{
//!     compiler::translate,
//!     simulation::{simulate, SimulationConfig, StopReason},
//! };
//!
//! fn main() {
//!     // Prints the character 'A' and stops.
//!     let source = r#"
//!         .code:
//!             PUSH    65
//!             OUTPUT
//!             HALT
//!     "#;
//!
//!     // Translate the source into a code image.
//!     let image = translate(source)
//!         .expect("could not translate the program");
//!
//!     // Run the image without any input.
//!     let report = simulate(image, Vec::new(), SimulationConfig::default())
//!         .expect("an error occured while simulating the program");
//!
//!     assert_eq!(report.output, "A");
//!     assert_eq!(report.stop, StopReason::Halted);
//!     assert_eq!(report.instructions, 3);
//!     assert_eq!(report.ticks, 5);
//! }
//! ```
//!
//! # Executables
//!
//! ## `acc32asm`
//!
//! Translates a source file into a code image file and reports the source line count and the
//! number of image records.
//!
//! ```text
//! $ acc32asm hello.asm hello.img
//! LoC: 26 code_instr: 33
//! ```
//!
//! ## `acc32sim`
//!
//! Runs a code image, optionally with an input event file of `<tick> <character>` lines.
//!
//! ```text
//! $ acc32sim cat.img cat.input
//! hey
//! Instructions: 72 Ticks: 139
//! ```
pub mod assembly;
pub mod compiler;
pub mod error;
pub mod event;
pub mod image;
pub mod isa;
pub mod machine;
pub mod parsing;
pub mod simulation;
pub mod symbol_table;

mod utils;
