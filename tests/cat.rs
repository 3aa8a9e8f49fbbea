use std::cell::RefCell;
use std::rc::Rc;

use acc32::{
    compiler::translate,
    event::Event,
    simulation::{parse_input_events, InputEvent, Simulation, SimulationConfig, StopReason},
};

use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

fn input_events() -> Vec<InputEvent> {
    parse_input_events(include_str!("cat.input"))
        .expect("could not parse cat.input")
}

#[test]
fn test_cat_input_events() {
    let events = input_events();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0], InputEvent { tick: 5, symbol: 'h' as u32 });
    assert_eq!(events[3], InputEvent { tick: 130, symbol: 0 });
}

#[test]
fn test_cat() {
    let image = translate(include_str!("cat.asm"))
        .expect("could not translate cat.asm");

    assert_eq!(image.interrupt_vector, Some(1));

    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = Logger::root(drain, o!());

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();

    let mut simulation = Simulation::with_logger(image, input_events(), SimulationConfig::default(), logger);
    simulation.add_listener(move |event: &Event| sink.borrow_mut().push(event.clone()));

    let report = simulation.run().expect("simulation failed");

    assert_eq!(report.output, "hey");
    assert_eq!(report.stop, StopReason::Halted);
    assert_eq!(report.instructions, 72);
    assert_eq!(report.ticks, 139);

    let events = events.borrow();

    let entries: Vec<_> = events.iter()
        .filter(|event| match event {
            Event::InterruptEnter { .. } => true,
            _ => false,
        })
        .collect();

    assert_eq!(entries.len(), 4);
    assert_eq!(*entries[0], Event::InterruptEnter { return_address: 0, vector: 1 });
    assert_eq!(events.last(), Some(&Event::Halt { address: 6 }));
}

#[test]
fn test_cat_without_sentinel() {
    let image = translate(include_str!("cat.asm")).unwrap();

    let mut events = input_events();
    events.pop();

    let config = SimulationConfig { limit: 1000, ..SimulationConfig::default() };
    let report = Simulation::new(image, events, config).run().unwrap();

    assert_eq!(report.output, "hey");
    assert_eq!(report.stop, StopReason::TickLimit);
    assert_eq!(report.ticks, 1000);
}
