pub mod agent;
pub mod contact;
pub mod feature;
pub mod granulate;
pub mod load;
pub mod motion;
pub mod pair;
pub mod slice;
pub mod window;

pub use agent::Agent;
pub use contact::Contact;
pub use feature::Direction;
pub use feature::Distance;
pub use feature::DistanceChange;
pub use feature::MutualDirection;
pub use feature::Speed;
pub use granulate::Granulate;
pub use load::Dataset;
pub use motion::Motion;
pub use pair::Pair;
pub use slice::Slice;
pub use window::cut_to_windows;
pub use window::Window;
