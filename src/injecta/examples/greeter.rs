use std::error::Error;
use std::sync::Arc;

use injecta::prelude::*;

fn main() {
    let container = Container::init(AppModule::new("greeter")).unwrap();
    container.scan();

    let app: Arc<App> = container.get("app").unwrap();
    app.run();
}

struct AppModule {
    app_name: &'static str,
}

impl AppModule {
    fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }
}

impl Module for AppModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        configurer.value("app_name", self.app_name);
        configurer.value("greetings", vec!["Hello World!", "你好世界!"]);
        Ok(())
    }
}

#[service("logger", deps = ["app_name"])]
struct ConsoleLogger {
    app_name: Arc<&'static str>,
}

impl ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

#[service("greeter", deps = ["greetings"])]
struct Greeter {
    #[inject(ConsoleLogger)]
    logger: Arc<ConsoleLogger>,
    greetings: Arc<Vec<&'static str>>,
}

impl Greeter {
    fn greet(&self) {
        for greeting in self.greetings.iter() {
            self.logger.log(greeting);
        }
    }
}

#[service("app")]
struct App {
    #[inject]
    logger: Arc<ConsoleLogger>,
    #[inject]
    greeter: Inject<Greeter>,
}

impl App {
    fn run(&self) {
        self.logger.log("Greeting from injecta managed services:");
        self.greeter.get().greet();
    }
}
