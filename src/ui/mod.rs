pub mod output;

pub use output::{
    print_notice, print_startup_status, render_status, speaker_line, type_out,
};
