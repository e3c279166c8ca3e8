use fibre_container::{Arguments, Callable, Container, Injectable, Instance, Method, Parameter, Parameters, Result};

struct Clock;

struct Greeter {
  greeting: String,
}

impl Injectable for Greeter {
  const CLASS: &'static str = "Greeter";

  fn parameters() -> Vec<Parameter> {
    vec![Parameter::new("greeting").with_default(String::from("Hello"))]
  }

  fn construct(args: &Arguments) -> Result<Self> {
    Ok(Greeter {
      greeting: args.value("greeting")?,
    })
  }

  fn methods() -> Vec<(&'static str, Method)> {
    vec![(
      "greet",
      Method::typed::<Greeter, String, _>(vec![Parameter::new("name")], |greeter, args| {
        Ok(format!("{}, {}!", greeter.greeting, args.value::<String>("name")?))
      }),
    )]
  }
}

fn main() -> Result<()> {
  let container = Container::new();
  container.register::<Greeter>();
  container.instance("Clock", Instance::new(Clock));

  // A "Class@method" reference: the receiver is built, then the method's
  // parameters are supplied from the call.
  let greeting = container.call(
    "Greeter@greet",
    &Parameters::new().with("name", String::from("world")),
    None,
  )?;
  println!("{}", greeting.downcast::<String>().unwrap_or_default());

  // A free callable: `clock` comes from the container, `times` from its default.
  let callable = Callable::new(|args| {
    let _clock = args.get::<Clock>("clock")?;
    Ok(args.value::<u32>("times")? * 2)
  })
  .named("tick")
  .parameter(Parameter::class("clock", "Clock"))
  .parameter(Parameter::new("times").with_default(21u32));

  let ticks = container.call(callable, &Parameters::new(), None)?;
  println!("ticked {} times", ticks.downcast::<u32>().map(|t| *t).unwrap_or(0));
  Ok(())
}
