use {
    anyhow::Context,
    doggerel::{CannedBackend, Config, PoemController},
    std::{
        io::{self, Write},
        sync::Arc,
    },
};

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = cli::parse_cli();

    let config = if cli.config.exists() {
        Config::read(&cli.config)?
    } else {
        Config::default()
    };

    let controller = PoemController::new(Arc::new(CannedBackend::new()), config.model);
    let mut state = controller.subscribe();

    state.wait_for(|state| state.loaded).await?;

    if let Some(error) = &state.borrow().init_error {
        anyhow::bail!("engine failed to load: {error}");
    }

    match &cli.roast {
        Some(path) => {
            let image =
                image::open(path).with_context(|| format!("opening {}", path.display()))?;

            controller.request_roast_from_image(image);
        }
        None => {
            let subject = if cli.subject.is_empty() {
                String::from("a broken toaster")
            } else {
                cli.subject.join(" ")
            };

            controller.request_poem_from_subject(&subject);
        }
    }

    if let Some(title) = &controller.state().title {
        println!("{title}");
        println!();
    }

    let mut printed = 0;

    loop {
        let complete = {
            let snapshot = state.borrow_and_update();

            if snapshot.verse_text.len() > printed {
                print!("{}", &snapshot.verse_text[printed..]);
                printed = snapshot.verse_text.len();
                io::stdout().flush()?;
            }

            snapshot.is_complete && printed > 0
        };

        if complete {
            break;
        }

        state.changed().await?;
    }

    controller.add_reaction("🔥");
    controller.add_reaction("😂");

    println!();
    println!("reactions:{}", controller.state().reaction_log);

    Ok(())
}
