use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;

use face_rec::capture::Camera;
use face_rec::dataset;
use face_rec::recognition::EigenRecognizer;
use face_rec::roi::RoiController;
use face_rec::session::{self, LiveWindow, Session};

#[derive(Parser)]
#[command(name = "face-rec")]
#[command(about = "Live webcam face recognition over a labeled sample set")]
struct Cli {
    /// Dataset root: one subdirectory per identity (s1, s2, ...), each
    /// holding .pgm samples
    #[arg(value_name = "DATASET", default_value = "att_faces")]
    dataset: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .compact()
        .init();

    let cli = Cli::parse();

    let corpus = dataset::load_corpus(&cli.dataset)?;
    if corpus.is_empty() {
        tracing::warn!(
            "no training samples under {}, recognition requests will be rejected",
            cli.dataset.display()
        );
    }

    println!("Wait 60 secs. for camera access to be obtained...");
    let mut camera = Camera::open(0)?;
    println!("Camera capture obtained. Drag square around face and click space to search.");

    let roi = Arc::new(Mutex::new(RoiController::new(session::default_roi())));
    let mut window = LiveWindow::open(session::WINDOW_TITLE, Arc::clone(&roi))?;
    let mut recognizer = EigenRecognizer::new()?;

    Session::new(&corpus, &roi).run(&mut camera, &mut window, &mut recognizer)?;
    Ok(())
}
