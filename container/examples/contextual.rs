use fibre_container::{Class, Concrete, Container, Instance, Parameter};
use std::sync::Arc;

trait Storage: Send + Sync {
  fn describe(&self) -> String;
}

struct LocalDisk;
impl Storage for LocalDisk {
  fn describe(&self) -> String {
    "local disk".to_string()
  }
}

struct S3Bucket;
impl Storage for S3Bucket {
  fn describe(&self) -> String {
    "s3 bucket".to_string()
  }
}

struct Controller {
  storage: Arc<dyn Storage>,
}

fn storage(kind: &'static str) -> Concrete {
  Concrete::factory(move |_, _| {
    let storage: Arc<dyn Storage> = match kind {
      "s3" => Arc::new(S3Bucket),
      _ => Arc::new(LocalDisk),
    };
    Ok(Instance::from_arc(storage))
  })
}

fn controller(name: &str) -> Class {
  Class::new(name)
    .parameter(Parameter::class("storage", "Storage"))
    .constructor(|args| {
      Ok(Controller {
        storage: args.get::<dyn Storage>("storage")?,
      })
    })
}

fn main() {
  let container = Container::new();
  container.bind("Storage", storage("local"), false);
  container.register_class(controller("PhotoController"));
  container.register_class(controller("VideoController"));

  // Videos go to S3, everything else keeps the default binding.
  container.when("VideoController").needs("Storage").give(storage("s3"));

  for name in ["PhotoController", "VideoController"] {
    let controller = container
      .make_as::<Controller>(name)
      .expect("controllers should build");
    println!("{} stores to {}", name, controller.storage.describe());
  }
}
