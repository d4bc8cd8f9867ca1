#[macro_use]
extern crate error_chain;
extern crate num_bigint;
extern crate num_traits;
extern crate serde;
extern crate serde_yaml;

pub mod cfg;
pub mod environment;
pub mod expr;
pub mod loader;
pub mod pipeline;
pub mod typeck;
pub mod util;

pub mod error {
    error_chain! {
        types {
            Error, ErrorKind, ResultExt, Result;
        }

        foreign_links {
            ParseBigIntError(::num_bigint::ParseBigIntError);
            IOError(::std::io::Error);
            SerdeYAML(::serde_yaml::Error);
            TypeCheck(crate::typeck::TypeError);
        }

        errors {
            Loader(m: String) {
                description("An error while loading a control flow graph")
                display("Loader error: {}", m)
            }
            Parser(m: String) {
                description("An error while parsing a statement")
                display("Parser error: {}", m)
            }
            Graph(m: String) {
                description("An error in the control flow graph")
                display("Graph error: {}", m)
            }
        }
    }
}
