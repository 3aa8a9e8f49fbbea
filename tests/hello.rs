use acc32::{
    compiler::translate,
    image::CodeImage,
    isa::{Instruction, Opcode},
    simulation::{simulate, SimulationConfig, StopReason},
};

fn translate_program() -> CodeImage {
    let source = include_str!("hello.asm");

    translate(source).expect("could not translate hello.asm")
}

#[test]
fn test_hello_layout() {
    let image = translate_program();

    assert_eq!(image.interrupt_vector, None);
    assert_eq!(image.len(), 32);

    assert_eq!(image.memory[0], Instruction { index: 0, opcode: Opcode::Load, value: Some(15) });
    assert_eq!(image.memory[5], Instruction { index: 5, opcode: Opcode::JumpZero, value: Some(14) });
    assert_eq!(image.memory[13], Instruction { index: 13, opcode: Opcode::Jump, value: Some(4) });
    assert_eq!(image.memory[14], Instruction { index: 14, opcode: Opcode::Halt, value: None });

    assert_eq!(image.memory[15].value, Some(13));
    assert_eq!(image.memory[16].value, Some('H' as u32));
    assert_eq!(image.memory[28].value, Some('!' as u32));
    assert_eq!(image.memory[31], Instruction { index: 31, opcode: Opcode::Number, value: Some(1) });
}

#[test]
fn test_hello_image_text() {
    let image = translate_program();
    let text = image.to_text();

    assert!(text.starts_with("___image___\n___vector___\n___memory___\n0 LOAD 15\n"));
    assert!(text.ends_with("31 NUMBER 1\n___end___\n"));

    let parsed = CodeImage::parse(&text).expect("could not parse the image");

    assert_eq!(parsed, image);
}

#[test]
fn test_hello_simulate() {
    let report = simulate(translate_program(), Vec::new(), SimulationConfig::default())
        .expect("simulation failed");

    assert_eq!(report.output, "Hello, world!");
    assert_eq!(report.stop, StopReason::Halted);
    assert_eq!(report.instructions, 137);
    assert_eq!(report.ticks, 355);
    assert_eq!(report.trace.len(), 200);
}
