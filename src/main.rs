use text_storage::PieceTable;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

fn main() -> text_storage::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    const CH: &str = "a";
    let mut pt = PieceTable::new("asdfjlkajslkdfjlkajsldkfjlkasjdlkfj");
    for i in 10..2000 {
        pt.insert(i, CH)?;
    }
    pt.insert(2, CH)?;
    pt.remove(4..294)?;
    for i in 3..1000 {
        pt.insert(i, CH)?;
    }

    info!(
        len_chars = pt.len_chars(),
        pieces = pt.piece_count(),
        edit_buffer_len = pt.edit_buffer_len(),
        edit_buffer_capacity = pt.edit_buffer_capacity(),
        "workload done"
    );

    Ok(())
}
