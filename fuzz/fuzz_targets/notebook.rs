#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use testmynb::notebook::{Notebook, NotebookDocument};
use testmynb::{Interpreter, TestCell};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Load and split only; cell bodies may not terminate.
        if let Ok(document) = NotebookDocument::from_json_str(s, Path::new("test_fuzz.ipynb")) {
            let notebook: Notebook<Interpreter> =
                Notebook::from_document(Path::new("/fuzz/test_fuzz.ipynb"), document, false);
            for cell in notebook.tests() {
                let _ = TestCell::rewrite_traceback(cell, "Traceback\n  File \"<string>\", line 7, in <module>\n");
            }
        }
    }
});
