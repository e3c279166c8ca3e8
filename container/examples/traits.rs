use fibre_container::{Class, Concrete, Container, Instance, Parameter};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  let container = Container::new();

  // --- Registration ---

  // The factory builds an Arc<ConsoleLogger> and serves it as Arc<dyn Logger>.
  container.singleton(
    "Logger",
    Concrete::factory(|_, _| Ok(Instance::from_arc::<dyn Logger>(Arc::new(ConsoleLogger)))),
  );

  // ReportService declares its dependency instead of resolving it itself.
  container.register_class(
    Class::new("ReportService")
      .parameter(Parameter::class("logger", "Logger"))
      .constructor(|args| {
        Ok(ReportService {
          logger: args.get::<dyn Logger>("logger")?,
        })
      }),
  );

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = container
    .make_as::<ReportService>("ReportService")
    .expect("ReportService should build");

  println!("Using the service...");
  report_service.generate_report();
}
