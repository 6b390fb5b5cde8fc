pub mod housekeeping_loop;
